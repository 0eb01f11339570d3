//! Training and prediction backends behind the model lifecycle

use crate::batch;
use crate::config::AppConfig;
use crate::error::TrainingError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::logistic::{Evaluation, FitOptions, LogisticModel};
use crate::types::prediction::{AnnotatedTransaction, FraudLabel, PredictionInput, PredictionResult};
use crate::types::transaction::LabeledTransaction;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// The pair of external routines the lifecycle mediates between.
///
/// The lifecycle never inspects `Model`; it only tracks whether one exists.
pub trait ModelBackend {
    type Model;

    /// Fit a new model from the labeled data at `source`.
    fn train(&self, source: &Path) -> Result<Self::Model, TrainingError>;

    /// Classify the input. Batch output keeps the input's row count and order.
    fn predict(&self, model: &Self::Model, input: &PredictionInput) -> PredictionResult;
}

/// Summary of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub rows: usize,
    pub fraud_rows: usize,
    pub train_rows: usize,
    pub validation: Evaluation,
    pub duration_ms: u128,
}

/// A fitted classifier plus the metadata of the run that produced it
#[derive(Debug, Clone, Serialize)]
pub struct FraudModel {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub source: PathBuf,
    pub threshold: f64,
    pub report: TrainingReport,
    classifier: LogisticModel,
}

impl FraudModel {
    /// Fraud probability for one feature row (0.0 - 1.0)
    pub fn score(&self, features: &[f32]) -> f64 {
        self.classifier.score(features)
    }

    pub fn label(&self, features: &[f32]) -> FraudLabel {
        FraudLabel::from_flag(self.score(features) >= self.threshold)
    }
}

impl fmt::Display for FraudModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model {} trained on {} rows ({} fraud) from {}, hold-out accuracy {:.1}%, recall {:.1}%",
            self.id,
            self.report.rows,
            self.report.fraud_rows,
            self.source.display(),
            self.report.validation.accuracy * 100.0,
            self.report.validation.recall * 100.0
        )
    }
}

/// CSV-trained logistic regression backend
#[derive(Debug, Clone)]
pub struct LogisticBackend {
    extractor: FeatureExtractor,
    fit: FitOptions,
    validation_split: f64,
    seed: u64,
    threshold: f64,
}

impl LogisticBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            fit: FitOptions {
                epochs: config.training.epochs,
                learning_rate: config.training.learning_rate,
                l2: config.training.l2,
                balance_classes: config.training.balance_classes,
            },
            validation_split: config.training.validation_split,
            seed: config.training.seed,
            threshold: config.detection.threshold,
        }
    }

    /// Fit directly from in-memory rows
    pub fn train_rows(
        &self,
        mut rows: Vec<LabeledTransaction>,
        source: &Path,
    ) -> Result<FraudModel, TrainingError> {
        if rows.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        let start = Instant::now();

        let mut rng = StdRng::seed_from_u64(self.seed);
        rows.shuffle(&mut rng);

        let total = rows.len();
        let held_out = ((total as f64) * self.validation_split).floor() as usize;
        // Always leave at least one row to fit on
        let held_out = held_out.min(total - 1);
        let (validation, training) = rows.split_at(held_out);

        let (train_x, train_y) = self.features_and_labels(training);
        let classifier = LogisticModel::fit(&train_x, &train_y, &self.fit);

        let eval_rows = if validation.is_empty() { training } else { validation };
        let (eval_x, eval_y) = self.features_and_labels(eval_rows);
        let predicted: Vec<bool> = eval_x
            .iter()
            .map(|x| classifier.score(x) >= self.threshold)
            .collect();
        let evaluation = Evaluation::from_predictions(&predicted, &eval_y);

        let report = TrainingReport {
            rows: total,
            fraud_rows: rows.iter().filter(|r| r.is_fraud()).count(),
            train_rows: training.len(),
            validation: evaluation,
            duration_ms: start.elapsed().as_millis(),
        };

        let model = FraudModel {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            source: source.to_path_buf(),
            threshold: self.threshold,
            report,
            classifier,
        };

        info!(
            model_id = %model.id,
            rows = model.report.rows,
            fraud_rows = model.report.fraud_rows,
            accuracy = format!("{:.3}", evaluation.accuracy),
            recall = format!("{:.3}", evaluation.recall),
            duration_ms = model.report.duration_ms,
            "Model trained"
        );

        Ok(model)
    }

    fn features_and_labels(&self, rows: &[LabeledTransaction]) -> (Vec<Vec<f32>>, Vec<bool>) {
        rows.iter()
            .map(|r| (self.extractor.extract(&r.transaction()), r.is_fraud()))
            .unzip()
    }
}

impl ModelBackend for LogisticBackend {
    type Model = FraudModel;

    fn train(&self, source: &Path) -> Result<FraudModel, TrainingError> {
        let file = match File::open(source) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TrainingError::DataMissing(source.to_path_buf()));
            }
            Err(e) => {
                return Err(TrainingError::Malformed(
                    anyhow::Error::new(e).context(format!("Failed to open {}", source.display())),
                ));
            }
        };

        info!(path = %source.display(), "Loading training data");
        let rows = batch::read_labeled(file).map_err(TrainingError::Malformed)?;
        self.train_rows(rows, source)
    }

    fn predict(&self, model: &FraudModel, input: &PredictionInput) -> PredictionResult {
        match input {
            PredictionInput::Single(tx) => {
                let score = model.score(&self.extractor.extract(tx));
                debug!(model_id = %model.id, score = score, "Scored transaction");
                PredictionResult::Single(FraudLabel::from_flag(score >= model.threshold))
            }
            PredictionInput::Batch(rows) => {
                let features = self.extractor.extract_batch(rows);
                PredictionResult::Batch(
                    rows.iter()
                        .zip(&features)
                        .map(|(tx, x)| AnnotatedTransaction::new(tx, model.label(x)))
                        .collect(),
                )
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::transaction::{ActionType, FraudType, Transaction};
    use std::io::Write;

    /// Labeled rows where fraud is exactly "typeoffraud != none".
    pub(crate) fn synthetic_rows(n: usize) -> Vec<LabeledTransaction> {
        let fraud_types = [FraudType::Type1, FraudType::Type2, FraudType::Type3];
        (0..n)
            .map(|i| {
                let is_fraud = i % 3 == 0;
                let tx = Transaction::new(
                    1000 + i as u64,
                    5000 + (i as u64 * 7) % 300,
                    if is_fraud { 250_000 + i as u64 * 13 } else { 800 + i as u64 * 3 },
                    (i % 12) as u8 + 1,
                    if i % 2 == 0 { ActionType::Transfer } else { ActionType::CashIn },
                    if is_fraud { fraud_types[(i / 3) % fraud_types.len()] } else { FraudType::None },
                );
                LabeledTransaction::from_parts(&tx, is_fraud)
            })
            .collect()
    }

    pub(crate) fn write_training_csv(path: &Path, rows: &[LabeledTransaction]) {
        let mut wtr = csv::Writer::from_path(path).unwrap();
        for row in rows {
            wtr.serialize(row).unwrap();
        }
        wtr.flush().unwrap();
    }

    #[test]
    fn test_train_from_csv_and_classify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base_data.csv");
        write_training_csv(&path, &synthetic_rows(90));

        let backend = LogisticBackend::new(&AppConfig::default());
        let model = backend.train(&path).unwrap();

        assert_eq!(model.report.rows, 90);
        assert_eq!(model.report.fraud_rows, 30);
        assert_eq!(model.report.train_rows, 72);
        assert!(model.report.validation.accuracy > 0.9);
        assert_eq!(model.source, path);

        let suspicious = Transaction::new(1, 2, 400_000, 5, ActionType::Transfer, FraudType::Type2);
        let ordinary = Transaction::new(3, 4, 900, 5, ActionType::CashIn, FraudType::None);
        assert_eq!(
            backend.predict(&model, &PredictionInput::Single(suspicious)),
            PredictionResult::Single(FraudLabel::Fraud)
        );
        assert_eq!(
            backend.predict(&model, &PredictionInput::Single(ordinary)),
            PredictionResult::Single(FraudLabel::NotFraud)
        );
    }

    #[test]
    fn test_missing_file_is_data_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let backend = LogisticBackend::new(&AppConfig::default());
        assert!(matches!(
            backend.train(&path),
            Err(TrainingError::DataMissing(p)) if p == path
        ));
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            "sourceid,destinationid,amountofmoney,month,typeofaction,typeoffraud,isfraud"
        )
        .unwrap();

        let backend = LogisticBackend::new(&AppConfig::default());
        assert!(matches!(backend.train(&path), Err(TrainingError::EmptyDataset)));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "sourceid,isfraud\nnot-a-number,1\n").unwrap();

        let backend = LogisticBackend::new(&AppConfig::default());
        assert!(matches!(backend.train(&path), Err(TrainingError::Malformed(_))));
    }

    #[test]
    fn test_batch_keeps_row_count_and_order() {
        let backend = LogisticBackend::new(&AppConfig::default());
        let model = backend
            .train_rows(synthetic_rows(60), Path::new("memory"))
            .unwrap();

        let rows: Vec<Transaction> = synthetic_rows(15).iter().map(|r| r.transaction()).collect();
        let result = backend.predict(&model, &PredictionInput::Batch(rows.clone()));

        let PredictionResult::Batch(annotated) = result else {
            panic!("expected batch result");
        };
        assert_eq!(annotated.len(), rows.len());
        for (out, tx) in annotated.iter().zip(&rows) {
            assert_eq!(out.sourceid, tx.sourceid);
            assert_eq!(out.amountofmoney, tx.amountofmoney);
        }
    }

    #[test]
    fn test_single_row_dataset_trains() {
        let backend = LogisticBackend::new(&AppConfig::default());
        let model = backend
            .train_rows(synthetic_rows(1), Path::new("memory"))
            .unwrap();
        assert_eq!(model.report.train_rows, 1);
        assert_eq!(model.report.validation.samples, 1);
    }
}
