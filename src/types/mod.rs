//! Type definitions for transaction screening

pub mod prediction;
pub mod transaction;

pub use prediction::{AnnotatedTransaction, FraudLabel, PredictionInput, PredictionResult};
pub use transaction::{ActionType, FraudType, LabeledTransaction, Transaction};
