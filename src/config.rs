//! Configuration: file locations, training parameters and log level.

use crate::classifier::ForestParams;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

/// Files and directories the tool reads and writes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Serialized classifier
    pub model: PathBuf,
    /// Labeled training dataset
    pub train_csv: PathBuf,
    /// Labeled held-out dataset for evaluation
    pub test_csv: PathBuf,
    /// Append-only prediction log
    pub predictions_csv: PathBuf,
    /// Directory of `<username>.json` profile snapshots
    pub profiles_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            model: PathBuf::from("model.msgpack"),
            train_csv: PathBuf::from("train.csv"),
            test_csv: PathBuf::from("test.csv"),
            predictions_csv: PathBuf::from("predictions.csv"),
            profiles_dir: PathBuf::from("profiles"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Share of the training CSV held out for the accuracy check
    pub test_ratio: f64,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let forest = ForestParams::default();
        TrainingConfig {
            test_ratio: 0.2,
            n_trees: forest.n_trees,
            max_depth: forest.max_depth,
            seed: forest.seed,
        }
    }
}

impl TrainingConfig {
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Defaults unless a config file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.paths.model, PathBuf::from("model.msgpack"));
        assert_eq!(config.training.test_ratio, 0.2);
        assert_eq!(config.training.forest_params(), ForestParams::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fakeprofile.toml");
        std::fs::write(
            &path,
            "[training]\nn_trees = 25\nmax_depth = 8\n\n[paths]\npredictions_csv = \"out/log.csv\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.training.n_trees, 25);
        assert_eq!(config.training.max_depth, Some(8));
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.paths.predictions_csv, PathBuf::from("out/log.csv"));
        assert_eq!(config.paths.train_csv, PathBuf::from("train.csv"));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/fakeprofile.toml");
        let config = AppConfig::load(Some(&path)).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.paths.profiles_dir, defaults.paths.profiles_dir);
        assert_eq!(config.training.forest_params(), defaults.training.forest_params());
        assert_eq!(config.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/fakeprofile.toml"))).is_err());
    }
}
