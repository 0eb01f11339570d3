//! Configuration management for the screening tool

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub training: TrainingConfig,
    pub detection: DetectionConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Model training configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Labeled CSV used when no path is given to `train`
    pub data_path: PathBuf,
    /// Full passes of gradient descent over the training rows
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 penalty on the weights
    pub l2: f64,
    /// Fraction of rows held out for evaluation (0.0 - 0.9)
    pub validation_split: f64,
    /// Seed for the shuffle before the hold-out split
    pub seed: u64,
    /// Reweight classes so fraud rows count as much as legitimate ones
    pub balance_classes: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/base_data.csv"),
            epochs: 400,
            learning_rate: 0.1,
            l2: 0.001,
            validation_split: 0.2,
            seed: 42,
            balance_classes: true,
        }
    }
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Fraud probability at or above which a row is labeled fraud
    pub threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Batch output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name used when a batch is run without an explicit output path
    pub batch_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            batch_file: PathBuf::from("Money-Laundering-Prediction.csv"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific path.
    ///
    /// A missing file falls back to defaults. `AML__SECTION__KEY`
    /// environment variables override file values.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("AML").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.threshold) {
            anyhow::bail!(
                "detection.threshold must be within [0, 1], got {}",
                self.detection.threshold
            );
        }
        if !(0.0..0.9).contains(&self.training.validation_split) {
            anyhow::bail!(
                "training.validation_split must be within [0, 0.9), got {}",
                self.training.validation_split
            );
        }
        if self.training.learning_rate <= 0.0 {
            anyhow::bail!("training.learning_rate must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.training.data_path, PathBuf::from("data/base_data.csv"));
        assert_eq!(config.detection.threshold, 0.5);
        assert_eq!(
            config.output.batch_file,
            PathBuf::from("Money-Laundering-Prediction.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.training.epochs, 400);
    }

    #[test]
    fn test_partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[detection]\nthreshold = 0.7\n\n[training]\nepochs = 25").unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.detection.threshold, 0.7);
        assert_eq!(config.training.epochs, 25);
        assert_eq!(config.training.seed, 42);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[training]\nl2 = 0.01\nbalance_classes = true").unwrap();

        // Only this test reads training.l2 through the loader
        std::env::set_var("AML__TRAINING__L2", "0.05");
        let config = AppConfig::load_from_path(&path);
        std::env::remove_var("AML__TRAINING__L2");

        let config = config.unwrap();
        assert_eq!(config.training.l2, 0.05);
        assert!(config.training.balance_classes);
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = AppConfig::default();
        config.detection.threshold = 1.5;
        assert!(config.validate().is_err());
    }
}
