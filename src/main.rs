use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fakeprofile::{
    AppConfig, CsvSink, ModelError, PredictionService, ProfileDirectory, RandomForest,
    dataset, interactive,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fakeprofile")]
#[command(about = "Classify social-media profiles as real or fake")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model file (overrides configuration)
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the classifier on a labeled CSV and save it
    Train {
        /// Labeled training dataset
        #[arg(long)]
        data: Option<PathBuf>,

        /// Retrain even if the saved model is newer than the dataset
        #[arg(long)]
        force: bool,
    },

    /// Score the saved model against a labeled CSV
    Evaluate {
        /// Labeled test dataset
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Fetch profiles by username, classify them and log the results
    Predict {
        #[arg(required = true)]
        usernames: Vec<String>,

        /// Directory of `<username>.json` profile snapshots
        #[arg(long)]
        profiles: Option<PathBuf>,

        /// Prediction log
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Enter the eleven feature values by hand
    Interactive,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.paths.model = model;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("fakeprofile={}", config.logging.level).parse()?),
        )
        .init();

    match cli.command {
        Commands::Train { data, force } => train(&config, data, force),
        Commands::Evaluate { data } => evaluate(&config, data),
        Commands::Predict {
            usernames,
            profiles,
            output,
        } => predict(&config, &usernames, profiles, output),
        Commands::Interactive => interactive_predict(&config),
    }
}

fn train(config: &AppConfig, data: Option<PathBuf>, force: bool) -> Result<()> {
    let csv_path = data.unwrap_or_else(|| config.paths.train_csv.clone());
    let model_path = &config.paths.model;
    let params = config.training.forest_params();

    if !force {
        fakeprofile::load_or_train_if_stale(model_path, &csv_path, config.training.test_ratio, &params)?;
        return Ok(());
    }

    println!("🧠 Training model... (This may take a moment)");
    let run = fakeprofile::train(&csv_path, config.training.test_ratio, &params)
        .with_context(|| format!("training on {}", csv_path.display()))?;
    println!(
        "Trained {} trees on {} rows ({} held out).",
        run.model.tree_count(),
        run.train_rows,
        run.test_rows
    );
    if let Some(accuracy) = run.holdout_accuracy {
        println!("✅ Model Accuracy on Test Data: {:.2}%", accuracy * 100.0);
    }
    run.model.save_to_file(model_path)?;
    println!("💾 Model has been saved as {:?}", model_path);
    Ok(())
}

fn evaluate(config: &AppConfig, data: Option<PathBuf>) -> Result<()> {
    let model_path = &config.paths.model;
    let model = match RandomForest::load_from_file(model_path) {
        Ok(model) => model,
        Err(ModelError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            println!(
                "Error: {:?} not found. Please run the training command first to create the model file.",
                model_path
            );
            return Ok(());
        }
        Err(e) => return Err(e).context("loading model"),
    };
    println!("📦 Model {:?} loaded successfully.", model_path);

    let csv_path = data.unwrap_or_else(|| config.paths.test_csv.clone());
    let records = dataset::load_labeled(&csv_path)
        .with_context(|| format!("reading test dataset {}", csv_path.display()))?;

    println!("\nMaking predictions on the test data...");
    let report = fakeprofile::evaluate(&model, &records);

    println!("\n--- Model Performance on {} ---", csv_path.display());
    println!("Accuracy: {:.2}%", report.accuracy * 100.0);
    println!("--------------------------------------\n");
    println!("Classification Report:");
    println!("{report}");
    Ok(())
}

fn predict(
    config: &AppConfig,
    usernames: &[String],
    profiles: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let model = fakeprofile::load_model(&config.paths.model);
    let source = ProfileDirectory::new(profiles.unwrap_or_else(|| config.paths.profiles_dir.clone()));
    let output = output.unwrap_or_else(|| config.paths.predictions_csv.clone());
    let sink = CsvSink::open(&output)
        .with_context(|| format!("opening predictions file {}", output.display()))?;
    let service = PredictionService::new(model, source, sink);

    let outcomes = service.predict_all(usernames);

    for (username, outcome) in outcomes {
        match outcome {
            Ok(outcome) => {
                println!("{username}: {} {}", outcome.prediction, outcome.features);
                if let Err(e) = &outcome.persistence {
                    println!("  ⚠️ Error saving to CSV: {e}");
                }
            }
            Err(e) => println!("{username}: {e}"),
        }
    }
    Ok(())
}

fn interactive_predict(config: &AppConfig) -> Result<()> {
    let Some(model) = fakeprofile::load_model(&config.paths.model) else {
        println!(
            "Error: {:?} could not be loaded. Please run the training command first to create the model file.",
            config.paths.model
        );
        return Ok(());
    };

    let features = match interactive::read_features_from_stdin() {
        Ok(features) => features,
        Err(e) => {
            println!("\n{e}");
            return Ok(());
        }
    };

    let prediction = model.predict_one(&features);
    println!("\n--- Prediction Result ---");
    println!("The model predicts that this account is: {prediction}");
    println!("-------------------------\n");
    Ok(())
}
