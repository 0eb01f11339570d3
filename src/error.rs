//! Error types for the screening core

use std::path::PathBuf;

/// Failures reported by the model lifecycle.
///
/// `TrainingDataMissing` and `ModelNotTrained` are recoverable by taking the
/// complementary action (supply data, or train first).
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("training data not found at {}", .0.display())]
    TrainingDataMissing(PathBuf),
    #[error("model is not trained yet")]
    ModelNotTrained,
    #[error("training failed: {0}")]
    Backend(#[source] anyhow::Error),
}

impl From<TrainingError> for LifecycleError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::DataMissing(path) => Self::TrainingDataMissing(path),
            other => Self::Backend(other.into()),
        }
    }
}

/// Failures raised by a backend while fitting a model.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("training data not found at {}", .0.display())]
    DataMissing(PathBuf),
    #[error("training data contains no rows")]
    EmptyDataset,
    #[error("malformed training data: {0:#}")]
    Malformed(anyhow::Error),
}

/// Invalid transaction fields or unparseable session input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} must be at least {min} (got {value})")]
    BelowMinimum {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("month must be between 1 and 12 (got {0})")]
    MonthOutOfRange(u8),
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("invalid value for {field}: '{value}'")]
    InvalidNumber { field: String, value: String },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("expected key=value, got '{0}'")]
    MalformedPair(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_missing_maps_to_lifecycle_variant() {
        let err: LifecycleError = TrainingError::DataMissing(PathBuf::from("data/x.csv")).into();
        assert!(matches!(err, LifecycleError::TrainingDataMissing(p) if p == PathBuf::from("data/x.csv")));
    }

    #[test]
    fn test_other_training_errors_map_to_backend() {
        let err: LifecycleError = TrainingError::EmptyDataset.into();
        assert!(matches!(err, LifecycleError::Backend(_)));
        assert!(err.to_string().contains("no rows"));
    }
}
