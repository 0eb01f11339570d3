//! Per-session counters for the screening tool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// Counters for one session
pub struct SessionMetrics {
    /// Successful training runs
    pub trainings: AtomicU64,
    /// Training runs that failed (missing or bad data)
    pub training_failures: AtomicU64,
    /// Transactions classified (single + batch rows)
    pub rows_screened: AtomicU64,
    /// Rows labeled fraud
    pub fraud_flagged: AtomicU64,
    /// Prediction requests refused because no model was trained
    pub rejected_predictions: AtomicU64,
    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            trainings: AtomicU64::new(0),
            training_failures: AtomicU64::new(0),
            rows_screened: AtomicU64::new(0),
            fraud_flagged: AtomicU64::new(0),
            rejected_predictions: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_training(&self, succeeded: bool) {
        let counter = if succeeded {
            &self.trainings
        } else {
            &self.training_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction(&self, rows: usize, fraud: usize) {
        self.rows_screened.fetch_add(rows as u64, Ordering::Relaxed);
        self.fraud_flagged.fetch_add(fraud as u64, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejected_predictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Share of screened rows labeled fraud, in percent
    pub fn fraud_rate(&self) -> f64 {
        let rows = self.rows_screened.load(Ordering::Relaxed);
        if rows == 0 {
            return 0.0;
        }
        self.fraud_flagged.load(Ordering::Relaxed) as f64 / rows as f64 * 100.0
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        info!(
            trainings = self.trainings.load(Ordering::Relaxed),
            training_failures = self.training_failures.load(Ordering::Relaxed),
            rows_screened = self.rows_screened.load(Ordering::Relaxed),
            fraud_flagged = self.fraud_flagged.load(Ordering::Relaxed),
            fraud_rate = format!("{:.1}%", self.fraud_rate()),
            rejected_predictions = self.rejected_predictions.load(Ordering::Relaxed),
            uptime_s = self.uptime().as_secs(),
            "Session summary"
        );
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = SessionMetrics::new();

        metrics.record_training(true);
        metrics.record_training(false);
        metrics.record_prediction(1, 1);
        metrics.record_prediction(9, 2);
        metrics.record_rejection();

        assert_eq!(metrics.trainings.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.training_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.rows_screened.load(Ordering::Relaxed), 10);
        assert_eq!(metrics.rejected_predictions.load(Ordering::Relaxed), 1);
        assert!((metrics.fraud_rate() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_fraud_rate_without_rows() {
        assert_eq!(SessionMetrics::new().fraud_rate(), 0.0);
    }
}
