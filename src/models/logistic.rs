//! Logistic regression with feature standardization

use serde::{Deserialize, Serialize};

/// Per-feature mean/std scaling fitted on training rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl Standardizer {
    /// Fit on a non-empty set of equal-length rows.
    pub fn fit(rows: &[Vec<f32>]) -> Self {
        let dims = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;

        let mut means = vec![0.0; dims];
        for row in rows {
            for (m, &x) in means.iter_mut().zip(row) {
                *m += f64::from(x);
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut stds = vec![0.0; dims];
        for row in rows {
            for ((s, &x), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (f64::from(x) - m).powi(2);
            }
        }
        // Constant columns keep std 1 so they scale to zero instead of NaN
        stds.iter_mut().for_each(|s| {
            let std = (*s / n).sqrt();
            *s = if std > 1e-12 { std } else { 1.0 };
        });

        Self { means, stds }
    }

    pub fn transform(&self, row: &[f32]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(&x, (m, s))| (f64::from(x) - m) / s)
            .collect()
    }

    pub fn dims(&self) -> usize {
        self.means.len()
    }
}

/// Gradient descent settings
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub balance_classes: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: 400,
            learning_rate: 0.1,
            l2: 0.001,
            balance_classes: true,
        }
    }
}

/// Binary logistic classifier over standardized features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    scaler: Standardizer,
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticModel {
    /// Fit with full-batch gradient descent.
    ///
    /// `rows` must be non-empty and the same length as `labels`.
    pub fn fit(rows: &[Vec<f32>], labels: &[bool], options: &FitOptions) -> Self {
        let scaler = Standardizer::fit(rows);
        let scaled: Vec<Vec<f64>> = rows.iter().map(|r| scaler.transform(r)).collect();
        let dims = scaler.dims();
        let n = scaled.len().max(1) as f64;

        let positives = labels.iter().filter(|&&l| l).count();
        let negatives = labels.len() - positives;
        let (pos_weight, neg_weight) = if options.balance_classes && positives > 0 && negatives > 0
        {
            let total = labels.len() as f64;
            (
                total / (2.0 * positives as f64),
                total / (2.0 * negatives as f64),
            )
        } else {
            (1.0, 1.0)
        };

        let mut weights = vec![0.0; dims];
        let mut bias = 0.0;

        for _ in 0..options.epochs {
            let mut grad_w = vec![0.0; dims];
            let mut grad_b = 0.0;

            for (x, &label) in scaled.iter().zip(labels) {
                let p = sigmoid(dot(&weights, x) + bias);
                let target = if label { 1.0 } else { 0.0 };
                let sample_weight = if label { pos_weight } else { neg_weight };
                let err = (p - target) * sample_weight;

                for (g, xi) in grad_w.iter_mut().zip(x) {
                    *g += err * xi;
                }
                grad_b += err;
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= options.learning_rate * (g / n + options.l2 * *w);
            }
            bias -= options.learning_rate * grad_b / n;
        }

        Self {
            scaler,
            weights,
            bias,
        }
    }

    /// Fraud probability for one feature row (0.0 - 1.0)
    pub fn score(&self, features: &[f32]) -> f64 {
        let z = self.scaler.transform(features);
        sigmoid(dot(&self.weights, &z) + self.bias)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Hold-out evaluation of a fitted model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    pub samples: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Evaluation {
    pub fn from_predictions(predicted: &[bool], actual: &[bool]) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut tn = 0usize;
        let mut fn_ = 0usize;
        for (&p, &a) in predicted.iter().zip(actual) {
            match (p, a) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, false) => tn += 1,
                (false, true) => fn_ += 1,
            }
        }

        let samples = tp + fp + tn + fn_;
        let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            samples,
            accuracy: ratio(tp + tn, samples),
            precision,
            recall,
            f1,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f32>>, Vec<bool>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = i as f32 * 0.01;
            rows.push(vec![2.0 + jitter, 1.0]);
            labels.push(true);
            rows.push(vec![-2.0 - jitter, 1.0]);
            labels.push(false);
        }
        (rows, labels)
    }

    #[test]
    fn test_standardizer_handles_constant_column() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = Standardizer::fit(&rows);
        let z = scaler.transform(&[3.0, 5.0]);
        assert!((z[0] - 1.0).abs() < 1e-9);
        assert_eq!(z[1], 0.0);
    }

    #[test]
    fn test_fit_separates_classes() {
        let (rows, labels) = separable();
        let model = LogisticModel::fit(&rows, &labels, &FitOptions::default());

        assert!(model.score(&[2.5, 1.0]) > 0.9);
        assert!(model.score(&[-2.5, 1.0]) < 0.1);
        assert!(model.weights()[0] > 0.0);
    }

    #[test]
    fn test_single_class_training_still_scores() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![false, false, false];
        let model = LogisticModel::fit(&rows, &labels, &FitOptions::default());
        assert!(model.score(&[2.0]) < 0.5);
    }

    #[test]
    fn test_evaluation_metrics() {
        let predicted = [true, true, false, false];
        let actual = [true, false, false, true];
        let eval = Evaluation::from_predictions(&predicted, &actual);
        assert_eq!(eval.samples, 4);
        assert!((eval.accuracy - 0.5).abs() < 1e-9);
        assert!((eval.precision - 0.5).abs() < 1e-9);
        assert!((eval.recall - 0.5).abs() < 1e-9);
        assert!((eval.f1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_evaluation_without_positives() {
        let eval = Evaluation::from_predictions(&[false, false], &[false, false]);
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.precision, 0.0);
        assert_eq!(eval.f1, 0.0);
    }
}
