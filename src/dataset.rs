//! Labeled CSV datasets mapped onto the canonical feature order.
//!
//! Training and evaluation both read rows through [`DatasetAdapter`], so a dataset whose
//! columns are shuffled or padded with extras still lands in the same slots.

use crate::classifier::Label;
use crate::error::{DatasetError, SchemaError};
use crate::features::{FEATURE_COUNT, Feature, FeatureVector};
use csv::StringRecord;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Header of the ground-truth column.
pub const TARGET_COLUMN: &str = "fake";

/// A feature vector with its known class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledRecord {
    pub features: FeatureVector,
    pub label: Label,
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
pub struct DatasetAdapter {
    feature_columns: [usize; FEATURE_COUNT],
    target_column: usize,
}

impl DatasetAdapter {
    /// Resolves every required column up front; reports all missing ones at once.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, SchemaError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let mut missing = Vec::new();
        let mut feature_columns = [0; FEATURE_COUNT];
        for feature in Feature::ALL {
            match position(feature.column()) {
                Some(i) => feature_columns[feature.index()] = i,
                None => missing.push(feature.column().to_string()),
            }
        }
        let target_column = position(TARGET_COLUMN);
        if target_column.is_none() {
            missing.push(TARGET_COLUMN.to_string());
        }

        match target_column {
            Some(target_column) if missing.is_empty() => Ok(DatasetAdapter {
                feature_columns,
                target_column,
            }),
            _ => Err(SchemaError { missing }),
        }
    }

    /// Pulls the feature slots and label out of one row. Values are taken as-is.
    pub fn adapt(&self, row: &StringRecord) -> Result<LabeledRecord, DatasetError> {
        let line = row.position().map_or(0, |p| p.line());
        let cell = |index: usize| row.get(index).unwrap_or("").trim();

        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            let raw = cell(self.feature_columns[feature.index()]);
            values[feature.index()] = raw.parse().map_err(|_| DatasetError::InvalidValue {
                line,
                column: feature.column(),
                value: raw.to_string(),
            })?;
        }

        let raw = cell(self.target_column);
        let label = parse_target(raw).ok_or_else(|| DatasetError::InvalidValue {
            line,
            column: TARGET_COLUMN,
            value: raw.to_string(),
        })?;

        Ok(LabeledRecord {
            features: FeatureVector::new(values),
            label,
        })
    }
}

fn parse_target(raw: &str) -> Option<Label> {
    let value: f64 = raw.parse().ok()?;
    if value == 0.0 {
        Some(Label::Real)
    } else if value == 1.0 {
        Some(Label::Fake)
    } else {
        None
    }
}

/// Reads every labeled row from a CSV source. The header is validated before any row is read.
pub fn read_labeled<R: Read>(reader: R) -> Result<Vec<LabeledRecord>, DatasetError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let adapter = DatasetAdapter::from_headers(rdr.headers()?)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        records.push(adapter.adapt(&result?)?);
    }
    Ok(records)
}

/// Loads a labeled dataset from a CSV file.
pub fn load_labeled(path: &Path) -> Result<Vec<LabeledRecord>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_labeled(file)?;
    info!(path = %path.display(), rows = records.len(), "dataset loaded");
    Ok(records)
}

/// A helper type for holding train/test splits.
#[derive(Debug)]
pub struct DatasetSplit {
    pub train: Vec<LabeledRecord>,
    pub test: Vec<LabeledRecord>,
}

/// Shuffles with a seeded RNG and moves `test_ratio` of the rows, rounded up, into the test set.
pub fn train_test_split(data: &[LabeledRecord], test_ratio: f64, seed: u64) -> DatasetSplit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = data.to_vec();
    data.shuffle(&mut rng);

    let test_size = ((data.len() as f64) * test_ratio.clamp(0.0, 1.0)).ceil() as usize;
    let train = data.split_off(test_size);

    DatasetSplit { train, test: data }
}

/// Splits records into parallel feature and label vectors.
pub fn unzip(records: &[LabeledRecord]) -> (Vec<FeatureVector>, Vec<Label>) {
    records.iter().map(|r| (r.features, r.label)).unzip()
}
