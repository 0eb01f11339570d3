//! Fraud classifier components

pub mod backend;
pub mod logistic;

pub use backend::{FraudModel, LogisticBackend, ModelBackend, TrainingReport};
pub use logistic::{Evaluation, LogisticModel};
