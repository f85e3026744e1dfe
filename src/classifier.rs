//! Binary real/fake classifier: a seeded bagged ensemble of `linfa-trees` decision trees.

use crate::error::ModelError;
use crate::features::{FEATURE_COUNT, FeatureVector};
use linfa::prelude::{Dataset, Fit as _, Predict as _};
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rmp_serde::{decode::from_read, encode::write_named};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info};

/// Ground-truth or predicted class. The numeric value is the dataset's `fake` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Real = 0,
    Fake = 1,
}

impl Label {
    pub fn from_target(target: usize) -> Option<Label> {
        match target {
            0 => Some(Label::Real),
            1 => Some(Label::Fake),
            _ => None,
        }
    }

    pub fn target(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Real => write!(f, "Real"),
            Label::Fake => write!(f, "Fake"),
        }
    }
}

/// What the prediction path needs from a fitted model.
pub trait Classifier: Send + Sync {
    fn predict(&self, vectors: &[FeatureVector]) -> Vec<Label>;

    fn predict_one(&self, vector: &FeatureVector) -> Label {
        self.predict(std::slice::from_ref(vector))
            .first()
            .copied()
            .unwrap_or(Label::Real)
    }
}

/// Hyperparameters for [`RandomForest::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_trees: 100,
            max_depth: None,
            seed: 42,
        }
    }
}

/// Trees fitted on bootstrap samples; prediction is a majority vote.
#[derive(Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree<f64, usize>>,
    params: ForestParams,
}

fn to_matrix(vectors: &[FeatureVector]) -> Array2<f64> {
    let mut x = Array2::zeros((vectors.len(), FEATURE_COUNT));
    for (mut row, vector) in x.rows_mut().into_iter().zip(vectors) {
        for (cell, value) in row.iter_mut().zip(vector.as_array()) {
            *cell = *value;
        }
    }
    x
}

impl RandomForest {
    /// Fits `params.n_trees` trees. The same records, labels and seed always give the same forest.
    pub fn fit(
        vectors: &[FeatureVector],
        labels: &[Label],
        params: &ForestParams,
    ) -> Result<Self, ModelError> {
        if vectors.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                records: vectors.len(),
                labels: labels.len(),
            });
        }
        if vectors.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if params.n_trees == 0 {
            return Err(ModelError::InvalidParams("n_trees must be at least 1".into()));
        }
        if params.max_depth == Some(0) {
            return Err(ModelError::InvalidParams("max_depth must be at least 1".into()));
        }

        let x = to_matrix(vectors);
        let y = Array1::from_iter(labels.iter().map(|l| l.target()));
        let n = vectors.len();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);

        for i in 0..params.n_trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            let dataset = Dataset::new(x.select(Axis(0), &sample), y.select(Axis(0), &sample));
            let tree = DecisionTree::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(params.max_depth)
                .fit(&dataset)
                .map_err(|e| ModelError::Fit(e.to_string()))?;
            debug!(tree = i, "fitted decision tree");
            trees.push(tree);
        }

        info!(
            trees = trees.len(),
            samples = n,
            seed = params.seed,
            "random forest trained"
        );
        Ok(RandomForest {
            trees,
            params: params.clone(),
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Fraction of trees voting `Fake` for each vector.
    pub fn fake_votes(&self, vectors: &[FeatureVector]) -> Vec<f64> {
        if vectors.is_empty() {
            return Vec::new();
        }
        let x = to_matrix(vectors);
        let mut votes = vec![0usize; vectors.len()];
        for tree in &self.trees {
            let predicted: Array1<usize> = tree.predict(&x);
            for (count, target) in votes.iter_mut().zip(predicted.iter()) {
                if *target == Label::Fake.target() {
                    *count += 1;
                }
            }
        }
        let total = self.trees.len().max(1) as f64;
        votes.into_iter().map(|v| v as f64 / total).collect()
    }

    /// Serializes the forest to a MessagePack blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        let mut buf = Vec::new();
        write_named(&mut buf, self)?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        Ok(from_read(bytes)?)
    }

    /// Saves the model to a binary `.msgpack` file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ModelError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_named(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads the model from a binary `.msgpack` file.
    pub fn load_from_file(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(from_read(reader)?)
    }
}

impl Classifier for RandomForest {
    fn predict(&self, vectors: &[FeatureVector]) -> Vec<Label> {
        // Ties go to Real.
        self.fake_votes(vectors)
            .into_iter()
            .map(|share| if share > 0.5 { Label::Fake } else { Label::Real })
            .collect()
    }
}

/// True when the model file is missing or older than the dataset it was trained from.
pub fn is_stale(model_path: &Path, csv_path: &Path) -> bool {
    let model_mtime = model_path
        .metadata()
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let csv_mtime = csv_path
        .metadata()
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);

    !model_path.exists() || csv_mtime > model_mtime
}
