//! Money Laundering Screening Library
//!
//! Train a fraud classifier from labeled transactions, then screen single
//! transactions or whole CSV batches. Prediction is only allowed once a
//! model has been trained in the current session.

pub mod batch;
pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod lifecycle;
pub mod metrics;
pub mod models;
pub mod session;
pub mod types;

pub use config::AppConfig;
pub use error::{LifecycleError, TrainingError};
pub use feature_extractor::FeatureExtractor;
pub use lifecycle::{ModelLifecycle, Phase, SessionState, TrainOutcome};
pub use models::{FraudModel, LogisticBackend, ModelBackend};
pub use session::Session;
pub use types::{FraudLabel, PredictionInput, PredictionResult, Transaction};
