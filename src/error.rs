//! Error types, one enum per concern.

use std::path::PathBuf;
use thiserror::Error;

/// A user-supplied value was missing or could not be parsed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Username is required!")]
    MissingUsername,

    #[error("invalid value {value:?} for {field}: expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("input ended before all values were entered")]
    EndOfInput,
}

/// Failure reported by an attribute source. Each variant maps to its own user-facing message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Error: Profile '{0}' not found.")]
    NotFound(String),

    #[error("Error: This profile is private or requires login. Cannot analyze.")]
    AccessRequired(String),

    #[error("An unexpected error occurred during scraping: {0}")]
    Unknown(String),
}

/// Required dataset columns are absent from the header row.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("dataset is missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid value {value:?} in column '{column}' on line {line}")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors fitting, saving or loading a classifier.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("cannot fit a classifier on an empty dataset")]
    EmptyDataset,

    #[error("record count {records} does not match label count {labels}")]
    LengthMismatch { records: usize, labels: usize },

    #[error("invalid forest parameters: {0}")]
    InvalidParams(String),

    #[error("tree fitting failed: {0}")]
    Fit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode model: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode model: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// The prediction record could not be appended to the sink.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("record sink lock was poisoned")]
    Poisoned,
}

/// Why a prediction request ended in the failed state.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Machine Learning model is not loaded. Please check the server logs.")]
    ModelUnavailable,

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Upstream(#[from] FetchError),

    /// The worker handling the request panicked.
    #[error("prediction aborted")]
    Aborted,
}
