//! Fetch, extract, classify and record a single profile.

use crate::classifier::{Classifier, Label};
use crate::error::{InputError, PersistenceError, PredictionError};
use crate::features::{self, FeatureVector};
use crate::sink::{PredictionRecord, RecordSink};
use crate::source::AttributeSource;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Lifecycle of one prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    FeaturesExtracted,
    Classified,
    Persisted,
    Done,
    Failed,
}

/// Result of a successful request. `persistence` carries a sink failure, which does not
/// invalidate the prediction.
#[derive(Debug)]
pub struct PredictionOutcome {
    pub username: String,
    pub features: FeatureVector,
    pub prediction: Label,
    pub persistence: Result<(), PersistenceError>,
}

impl PredictionOutcome {
    pub fn is_persisted(&self) -> bool {
        self.persistence.is_ok()
    }
}

pub struct PredictionService<S, K> {
    model: Option<Arc<dyn Classifier>>,
    source: S,
    sink: K,
}

impl<S: AttributeSource, K: RecordSink> PredictionService<S, K> {
    /// `model` is `None` when loading failed; every request then fails with `ModelUnavailable`.
    pub fn new(model: Option<Arc<dyn Classifier>>, source: S, sink: K) -> Self {
        PredictionService {
            model,
            source,
            sink,
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn predict(&self, username: &str) -> Result<PredictionOutcome, PredictionError> {
        let mut state = RequestState::Received;
        let result = self.run(username, &mut state);
        match &result {
            Ok(outcome) => info!(
                username,
                prediction = %outcome.prediction,
                persisted = outcome.is_persisted(),
                "prediction complete"
            ),
            Err(e) => {
                warn!(username, reached = ?state, error = %e, "prediction failed");
                advance(&mut state, RequestState::Failed);
            }
        }
        result
    }

    /// Runs one request per username on scoped threads. Results keep input order; a worker that
    /// panics yields `Aborted` for its username instead of being dropped.
    pub fn predict_all<'a>(
        &self,
        usernames: &'a [String],
    ) -> Vec<(&'a str, Result<PredictionOutcome, PredictionError>)> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = usernames
                .iter()
                .map(|username| (username.as_str(), scope.spawn(move || self.predict(username))))
                .collect();
            handles
                .into_iter()
                .map(|(username, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        error!(username, "prediction worker panicked");
                        Err(PredictionError::Aborted)
                    });
                    (username, result)
                })
                .collect()
        })
    }

    fn run(
        &self,
        username: &str,
        state: &mut RequestState,
    ) -> Result<PredictionOutcome, PredictionError> {
        let model = self.model.as_ref().ok_or(PredictionError::ModelUnavailable)?;
        if username.is_empty() {
            return Err(InputError::MissingUsername.into());
        }

        let profile = self.source.fetch(username)?;
        let features = features::extract(&profile);
        advance(state, RequestState::FeaturesExtracted);

        let prediction = model.predict_one(&features);
        advance(state, RequestState::Classified);

        let record = PredictionRecord {
            username: username.to_string(),
            features,
            prediction,
        };
        let persistence = self.sink.append(&record);
        match &persistence {
            Ok(()) => advance(state, RequestState::Persisted),
            Err(e) => error!(username, error = %e, "Error saving prediction"),
        }
        advance(state, RequestState::Done);

        Ok(PredictionOutcome {
            username: record.username,
            features: record.features,
            prediction: record.prediction,
            persistence,
        })
    }
}

fn advance(state: &mut RequestState, next: RequestState) {
    let from = *state;
    debug!(?from, to = ?next, "request state");
    *state = next;
}
