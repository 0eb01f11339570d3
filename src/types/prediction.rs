//! Prediction inputs and results

use crate::types::transaction::{ActionType, FraudType, Transaction};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary classification output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FraudLabel {
    Fraud,
    NotFraud,
}

impl FraudLabel {
    pub fn from_flag(is_fraud: bool) -> Self {
        if is_fraud {
            FraudLabel::Fraud
        } else {
            FraudLabel::NotFraud
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, FraudLabel::Fraud)
    }

    /// CSV encoding, matching the `isfraud` training column
    pub fn as_flag(&self) -> u8 {
        u8::from(self.is_fraud())
    }
}

impl fmt::Display for FraudLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FraudLabel::Fraud => f.write_str("Fraud"),
            FraudLabel::NotFraud => f.write_str("Not Fraud"),
        }
    }
}

/// What to classify: one form entry or a whole uploaded table.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionInput {
    Single(Transaction),
    Batch(Vec<Transaction>),
}

impl PredictionInput {
    pub fn len(&self) -> usize {
        match self {
            PredictionInput::Single(_) => 1,
            PredictionInput::Batch(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A batch row with its predicted label appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedTransaction {
    pub sourceid: u64,
    pub destinationid: u64,
    pub amountofmoney: u64,
    pub month: u8,
    pub typeofaction: ActionType,
    pub typeoffraud: FraudType,
    /// Predicted label, 1 = fraud
    pub isfraud: u8,
}

impl AnnotatedTransaction {
    pub fn new(tx: &Transaction, label: FraudLabel) -> Self {
        Self {
            sourceid: tx.sourceid,
            destinationid: tx.destinationid,
            amountofmoney: tx.amountofmoney,
            month: tx.month,
            typeofaction: tx.typeofaction,
            typeoffraud: tx.typeoffraud,
            isfraud: label.as_flag(),
        }
    }

    pub fn label(&self) -> FraudLabel {
        FraudLabel::from_flag(self.isfraud != 0)
    }
}

/// Output mirrors the input shape.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionResult {
    Single(FraudLabel),
    Batch(Vec<AnnotatedTransaction>),
}

impl PredictionResult {
    /// Number of rows flagged as fraud
    pub fn fraud_count(&self) -> usize {
        match self {
            PredictionResult::Single(label) => usize::from(label.is_fraud()),
            PredictionResult::Batch(rows) => rows.iter().filter(|r| r.label().is_fraud()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_display_and_flag() {
        assert_eq!(FraudLabel::Fraud.to_string(), "Fraud");
        assert_eq!(FraudLabel::NotFraud.to_string(), "Not Fraud");
        assert_eq!(FraudLabel::Fraud.as_flag(), 1);
        assert_eq!(FraudLabel::from_flag(false), FraudLabel::NotFraud);
    }

    #[test]
    fn test_annotated_keeps_input_fields() {
        let tx = Transaction::default();
        let row = AnnotatedTransaction::new(&tx, FraudLabel::Fraud);
        assert_eq!(row.sourceid, tx.sourceid);
        assert_eq!(row.typeoffraud, tx.typeoffraud);
        assert_eq!(row.label(), FraudLabel::Fraud);
    }

    #[test]
    fn test_fraud_count() {
        let tx = Transaction::default();
        let result = PredictionResult::Batch(vec![
            AnnotatedTransaction::new(&tx, FraudLabel::Fraud),
            AnnotatedTransaction::new(&tx, FraudLabel::NotFraud),
            AnnotatedTransaction::new(&tx, FraudLabel::Fraud),
        ]);
        assert_eq!(result.fraud_count(), 2);
        assert_eq!(PredictionResult::Single(FraudLabel::NotFraud).fraud_count(), 0);
        assert_eq!(PredictionInput::Batch(Vec::new()).len(), 0);
    }
}
