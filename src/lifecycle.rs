//! Model lifecycle: gates prediction on a successful training run.
//!
//! A session owns exactly one `ModelLifecycle`. The tracker is in one of
//! two states, `Untrained` (initial) or `Trained`. A successful `train`
//! always lands in `Trained`, replacing any earlier model wholesale. A
//! failed `train` leaves the state exactly as it was. `predict` never
//! changes state and is rejected while untrained.

use crate::error::LifecycleError;
use crate::models::backend::ModelBackend;
use crate::types::prediction::{PredictionInput, PredictionResult};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where a session stands in the train-then-predict flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Untrained,
    Trained,
}

/// Per-session model state. A model is present iff the session is trained.
#[derive(Debug)]
pub struct SessionState<M> {
    trained_model: Option<M>,
}

impl<M> SessionState<M> {
    pub fn new() -> Self {
        Self {
            trained_model: None,
        }
    }

    pub fn model_trained(&self) -> bool {
        self.trained_model.is_some()
    }

    pub fn trained_model(&self) -> Option<&M> {
        self.trained_model.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if self.model_trained() {
            Phase::Trained
        } else {
            Phase::Untrained
        }
    }

    /// Swap in a new model wholesale, dropping any earlier one.
    /// Returns the installed model and whether one was replaced.
    fn install(&mut self, model: M) -> (&M, bool) {
        let replaced = self.trained_model.take().is_some();
        (self.trained_model.insert(model), replaced)
    }
}

impl<M> Default for SessionState<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a successful `train` call
#[derive(Debug)]
pub struct TrainOutcome<'a, M> {
    /// The freshly trained model now held by the session
    pub model: &'a M,
    /// An earlier model was discarded to make room for this one
    pub replaced_previous: bool,
}

/// Mediates between train and predict requests for one session.
pub struct ModelLifecycle<B: ModelBackend> {
    backend: B,
    default_source: PathBuf,
    state: SessionState<B::Model>,
}

impl<B: ModelBackend> ModelLifecycle<B> {
    /// Start untrained. `default_source` is used when `train` gets no path.
    pub fn new(backend: B, default_source: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            default_source: default_source.into(),
            state: SessionState::new(),
        }
    }

    /// Train a new model and make it the session's model.
    ///
    /// Missing training data yields `TrainingDataMissing`; any failure leaves
    /// the current state (and model, if any) untouched. No retry or fallback
    /// path is attempted.
    pub fn train(
        &mut self,
        source: Option<&Path>,
    ) -> Result<TrainOutcome<'_, B::Model>, LifecycleError> {
        let source = source.unwrap_or(self.default_source.as_path());
        info!(path = %source.display(), "Training requested");

        let model = match self.backend.train(source) {
            Ok(model) => model,
            Err(e) => {
                let err = LifecycleError::from(e);
                warn!(
                    path = %source.display(),
                    error = %err,
                    still_trained = self.state.model_trained(),
                    "Training failed, session state unchanged"
                );
                return Err(err);
            }
        };

        let (model, replaced_previous) = self.state.install(model);
        if replaced_previous {
            info!("Previously trained model discarded and replaced");
        }
        Ok(TrainOutcome {
            model,
            replaced_previous,
        })
    }

    /// Classify the input with the current model.
    ///
    /// Fails with `ModelNotTrained` without touching the backend when no
    /// model is present.
    pub fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, LifecycleError> {
        let Some(model) = self.state.trained_model() else {
            warn!(rows = input.len(), "Prediction rejected: model not trained");
            return Err(LifecycleError::ModelNotTrained);
        };
        Ok(self.backend.predict(model, input))
    }

    pub fn state(&self) -> &SessionState<B::Model> {
        &self.state
    }

    pub fn is_trained(&self) -> bool {
        self.state.model_trained()
    }

    pub fn model(&self) -> Option<&B::Model> {
        self.state.trained_model()
    }

    pub fn default_source(&self) -> &Path {
        &self.default_source
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
