//! Synthetic Dataset Generator
//!
//! Writes labeled transactions as CSV for training, or unlabeled ones for
//! batch screening.

use aml_screening::types::{ActionType, FraudType, LabeledTransaction, Transaction};
use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "generate-dataset", about = "Generate synthetic screening data")]
struct Args {
    /// Output CSV path
    #[arg(short, long, default_value = "data/base_data.csv")]
    output: PathBuf,
    /// Number of rows
    #[arg(short, long, default_value_t = 1000)]
    count: usize,
    /// Fraction of rows generated from the laundering pattern
    #[arg(long, default_value_t = 0.1)]
    fraud_rate: f64,
    /// Omit the isfraud column (batch input instead of training data)
    #[arg(long)]
    unlabeled: bool,
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// Transaction generator
struct TransactionGenerator {
    rng: StdRng,
}

impl TransactionGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Ordinary account activity
    fn generate_legitimate(&mut self) -> Transaction {
        let action = if self.rng.gen_bool(0.7) {
            ActionType::CashIn
        } else {
            ActionType::Transfer
        };
        // Mostly clean history, a few accounts with an old flag
        let history = if self.rng.gen_bool(0.9) {
            FraudType::None
        } else {
            self.random_fraud_type()
        };

        Transaction::new(
            self.rng.gen_range(1..50_000),
            self.rng.gen_range(1..50_000),
            self.rng.gen_range(10..20_000),
            self.rng.gen_range(1..=12),
            action,
            history,
        )
    }

    /// Layering pattern: large round transfers between flagged accounts
    fn generate_suspicious(&mut self) -> Transaction {
        let source = self.rng.gen_range(1..500);
        let destination = if self.rng.gen_bool(0.2) {
            source
        } else {
            self.rng.gen_range(1..500)
        };
        let thousands: u64 = self.rng.gen_range(50..900);
        let amount = if self.rng.gen_bool(0.6) {
            thousands * 1000
        } else {
            thousands * 1000 + self.rng.gen_range(1..1000)
        };
        let action = if self.rng.gen_bool(0.8) {
            ActionType::Transfer
        } else {
            ActionType::CashIn
        };
        let fraud_type = self.random_fraud_type();

        Transaction::new(
            source,
            destination,
            amount,
            self.rng.gen_range(1..=12),
            action,
            fraud_type,
        )
    }

    fn random_fraud_type(&mut self) -> FraudType {
        [FraudType::Type1, FraudType::Type2, FraudType::Type3][self.rng.gen_range(0..3)]
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_dataset=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.fraud_rate) {
        anyhow::bail!("--fraud-rate must be within [0, 1]");
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut wtr = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let mut generator = TransactionGenerator::new(args.seed);
    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for _ in 0..args.count {
        let is_fraud = generator.rng.gen_bool(args.fraud_rate);
        let tx = if is_fraud {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        if args.unlabeled {
            wtr.serialize(&tx)?;
        } else {
            wtr.serialize(LabeledTransaction::from_parts(&tx, is_fraud))?;
        }
    }
    wtr.flush()?;

    info!(
        output = %args.output.display(),
        rows = args.count,
        legitimate = legitimate_count,
        suspicious = suspicious_count,
        labeled = !args.unlabeled,
        "Dataset written"
    );

    Ok(())
}
