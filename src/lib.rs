//! # fakeprofile 🕵️
//!
//! Classify social-media profiles as real or fake from eleven hand-engineered features.
//!
//! Raw profile attributes (username, full name, bio, counts, ...) are turned into a fixed-order
//! [`FeatureVector`] and fed to a seeded bagged ensemble of
//! [`linfa-trees`](https://crates.io/crates/linfa-trees) decision trees.
//!
//! ## Features
//! - Deterministic feature extraction shared by training, evaluation and inference
//! - Labeled CSV datasets mapped onto the canonical feature order, schema checked up front
//! - Random forest with seeded bootstrap sampling
//! - Model persistence with `rmp-serde` (MessagePack)
//! - Retrain only when the training CSV is newer than the model
//! - Append-only CSV log of predictions, safe under concurrent requests
//!
//! ## Example
//! ```rust
//! use fakeprofile::{extract, ProfileAttributes};
//! let features = extract(&ProfileAttributes {
//!     username: "john123".into(),
//!     full_name: "John Doe".into(),
//!     has_profile_pic: true,
//!     biography: "hi".into(),
//!     external_url: None,
//!     is_private: false,
//!     media_count: 10,
//!     follower_count: 100,
//!     followee_count: 50,
//! });
//! assert_eq!(features.to_string(), "[1, 0.4286, 2, 0.0, 0, 2, 0, 0, 10, 100, 50]");
//! ```

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod interactive;
pub mod metrics;
pub mod service;
pub mod sink;
pub mod source;

pub use classifier::{Classifier, ForestParams, Label, RandomForest};
pub use config::AppConfig;
pub use dataset::{DatasetAdapter, LabeledRecord};
pub use error::{
    DatasetError, FetchError, InputError, ModelError, PersistenceError, PredictionError,
    SchemaError,
};
pub use features::{Feature, FeatureVector, ProfileAttributes, extract};
pub use metrics::ClassificationReport;
pub use service::{PredictionOutcome, PredictionService};
pub use sink::{CsvSink, PredictionRecord, RecordSink};
pub use source::{AttributeSource, ProfileDirectory};

use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Loads the model for serving. Any failure is logged and yields `None`, which leaves the
/// prediction path reporting "unavailable" instead of aborting.
pub fn load_model(path: &Path) -> Option<Arc<dyn Classifier>> {
    match RandomForest::load_from_file(path) {
        Ok(model) => {
            info!(path = %path.display(), trees = model.tree_count(), "Model loaded successfully");
            Some(Arc::new(model))
        }
        Err(ModelError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            error!(path = %path.display(), "model file not found; predictions are disabled");
            None
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to load model; predictions are disabled");
            None
        }
    }
}

/// Outcome of [`train`]: the fitted model and its accuracy on the held-out split.
pub struct TrainingRun {
    pub model: RandomForest,
    pub holdout_accuracy: Option<f64>,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Fits a forest on the labeled CSV, holding out `test_ratio` of it for an accuracy check.
pub fn train(
    csv_path: &Path,
    test_ratio: f64,
    params: &ForestParams,
) -> anyhow::Result<TrainingRun> {
    let records = dataset::load_labeled(csv_path)?;
    let split = dataset::train_test_split(&records, test_ratio, params.seed);

    let (x_train, y_train) = dataset::unzip(&split.train);
    let model = RandomForest::fit(&x_train, &y_train, params)?;

    let holdout_accuracy = if split.test.is_empty() {
        None
    } else {
        Some(evaluate(&model, &split.test).accuracy)
    };

    Ok(TrainingRun {
        model,
        holdout_accuracy,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
    })
}

/// Predicts every record and compares against its label.
pub fn evaluate<C: Classifier + ?Sized>(model: &C, records: &[LabeledRecord]) -> ClassificationReport {
    let (x, y) = dataset::unzip(records);
    let predicted = model.predict(&x);
    ClassificationReport::new(&y, &predicted)
}

/// Load a saved model if up-to-date, or retrain if the CSV is newer.
pub fn load_or_train_if_stale(
    model_path: &Path,
    csv_path: &Path,
    test_ratio: f64,
    params: &ForestParams,
) -> anyhow::Result<RandomForest> {
    if classifier::is_stale(model_path, csv_path) {
        println!("🧠 Training model (CSV is newer or model missing)...");
        let run = train(csv_path, test_ratio, params)?;
        if let Some(accuracy) = run.holdout_accuracy {
            println!("✅ Accuracy on held-out data: {:.2}%", accuracy * 100.0);
        }
        println!("💾 Saving model to {:?}", model_path);
        run.model.save_to_file(model_path)?;
        Ok(run.model)
    } else {
        println!("📦 Loading model from {:?} (up-to-date)", model_path);
        Ok(RandomForest::load_from_file(model_path)?)
    }
}
