//! Feature extraction for the laundering classifier.
//!
//! Training and prediction both go through this module so the feature
//! order seen by a fitted model never drifts from the one used to fit it.

use crate::types::transaction::{ActionType, FraudType, Transaction};
use std::f32::consts::PI;

const FEATURE_NAMES: [&str; 10] = [
    "log_amount",
    "month_sin",
    "month_cos",
    "is_transfer",
    "fraud_type1",
    "fraud_type2",
    "fraud_type3",
    "fraud_none",
    "self_transfer",
    "round_amount",
];

/// Transforms transactions into model input features.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a transaction, in `feature_names()` order.
    pub fn extract(&self, tx: &Transaction) -> Vec<f32> {
        let mut features = Vec::with_capacity(FEATURE_NAMES.len());

        features.push((tx.amountofmoney as f64).ln_1p() as f32);

        // Cyclical month so December sits next to January
        let angle = 2.0 * PI * (f32::from(tx.month) - 1.0) / 12.0;
        features.push(angle.sin());
        features.push(angle.cos());

        features.push(flag(tx.typeofaction == ActionType::Transfer));

        for fraud_type in FraudType::ALL {
            features.push(flag(tx.typeoffraud == fraud_type));
        }

        features.push(flag(tx.sourceid == tx.destinationid));
        features.push(flag(tx.amountofmoney % 1000 == 0));

        features
    }

    pub fn extract_batch(&self, rows: &[Transaction]) -> Vec<Vec<f32>> {
        rows.iter().map(|tx| self.extract(tx)).collect()
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_NAMES.len()
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_extraction() {
        let extractor = FeatureExtractor::new();
        let tx = Transaction::new(10, 20, 5000, 1, ActionType::Transfer, FraudType::Type3);

        let features = extractor.extract(&tx);

        assert_eq!(features.len(), extractor.feature_count());
        assert!((features[0] - 5001f32.ln()).abs() < 1e-4);
        assert!(features[1].abs() < 1e-6); // sin(0)
        assert!((features[2] - 1.0).abs() < 1e-6); // cos(0)
        assert_eq!(features[3], 1.0);
        assert_eq!(&features[4..8], &[0.0, 0.0, 1.0, 0.0]);
        assert_eq!(features[8], 0.0);
        assert_eq!(features[9], 1.0);
    }

    #[test]
    fn test_self_transfer_flag() {
        let extractor = FeatureExtractor::new();
        let tx = Transaction::new(7, 7, 123, 6, ActionType::CashIn, FraudType::None);
        let features = extractor.extract(&tx);
        assert_eq!(features[3], 0.0);
        assert_eq!(features[7], 1.0);
        assert_eq!(features[8], 1.0);
        assert_eq!(features[9], 0.0);
    }

    #[test]
    fn test_feature_count() {
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.feature_count(), 10);
        assert_eq!(extractor.feature_names().len(), 10);
    }

    #[test]
    fn test_extract_batch_keeps_order() {
        let extractor = FeatureExtractor::new();
        let rows = vec![
            Transaction::new(1, 2, 1000, 3, ActionType::Transfer, FraudType::Type1),
            Transaction::new(4, 5, 77, 9, ActionType::CashIn, FraudType::None),
        ];
        let batch = extractor.extract_batch(&rows);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], extractor.extract(&rows[0]));
        assert_eq!(batch[1], extractor.extract(&rows[1]));
    }
}
