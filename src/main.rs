//! Money Laundering Screening - Main Entry Point
//!
//! Trains the classifier and screens transactions, either interactively or
//! as one-shot commands.

use aml_screening::{
    batch,
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    lifecycle::ModelLifecycle,
    models::LogisticBackend,
    session::Session,
    types::{ActionType, FraudType, PredictionInput, PredictionResult, Transaction},
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aml-screen", version, about = "Money laundering transaction screening")]
struct Cli {
    /// Configuration file (TOML); missing file means defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session on stdin/stdout (default)
    Session,
    /// Train once and print the training report
    Train {
        #[command(flatten)]
        data: DataArg,
    },
    /// Train, then classify one transaction
    Predict {
        #[command(flatten)]
        data: DataArg,
        #[arg(long, default_value_t = 44604)]
        sourceid: u64,
        #[arg(long, default_value_t = 7869)]
        destinationid: u64,
        #[arg(long, default_value_t = 59999)]
        amount: u64,
        #[arg(long, default_value_t = 3)]
        month: u8,
        /// cash-in or transfer
        #[arg(long, default_value = "cash-in")]
        action: String,
        /// type1, type2, type3 or none
        #[arg(long, default_value = "type1")]
        fraud: String,
    },
    /// Train, then annotate every row of a CSV file
    Batch {
        #[command(flatten)]
        data: DataArg,
        #[arg(short, long)]
        input: PathBuf,
        /// Defaults to output.batch_file from the configuration
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct DataArg {
    /// Labeled training CSV (defaults to training.data_path)
    #[arg(long)]
    data: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from_path(&cli.config)?;
    init_logging(&config.logging)?;

    info!(
        config = %cli.config.display(),
        data_path = %config.training.data_path.display(),
        threshold = config.detection.threshold,
        "Configuration loaded"
    );

    let backend = LogisticBackend::new(&config);
    let mut lifecycle = ModelLifecycle::new(backend, &config.training.data_path);

    match cli.command.unwrap_or(Command::Session) {
        Command::Session => {
            let mut session = Session::new(lifecycle, &config.output.batch_file);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            session.run(stdin.lock(), &mut stdout)?;
        }
        Command::Train { data } => {
            let outcome = lifecycle.train(data.data.as_deref())?;
            println!("Model training completed! {}", outcome.model);
            println!("{}", serde_json::to_string_pretty(&outcome.model.report)?);
        }
        Command::Predict {
            data,
            sourceid,
            destinationid,
            amount,
            month,
            action,
            fraud,
        } => {
            let action: ActionType = action.parse()?;
            let fraud: FraudType = fraud.parse()?;
            let tx = Transaction::new(sourceid, destinationid, amount, month, action, fraud);
            tx.validate()?;

            lifecycle.train(data.data.as_deref())?;
            match lifecycle.predict(&PredictionInput::Single(tx))? {
                PredictionResult::Single(label) => println!("The transaction is {label}."),
                PredictionResult::Batch(_) => bail!("unexpected batch result for a single transaction"),
            }
        }
        Command::Batch {
            data,
            input,
            output,
        } => {
            let rows = batch::read_transactions_from_path(&input)?;
            lifecycle.train(data.data.as_deref())?;

            let result = lifecycle.predict(&PredictionInput::Batch(rows))?;
            let fraud = result.fraud_count();
            let PredictionResult::Batch(annotated) = result else {
                bail!("unexpected single result for a batch");
            };

            let output = output.unwrap_or(config.output.batch_file.clone());
            batch::write_annotated_to_path(&output, &annotated)
                .with_context(|| format!("Failed to write predictions to {}", output.display()))?;
            println!(
                "Predictions written to {} ({} rows, {} flagged as fraud).",
                output.display(),
                annotated.len(),
                fraud
            );
        }
    }

    Ok(())
}

/// Initialize logging to stderr so command output on stdout stays clean.
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid logging.level")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        "pretty" | "text" => builder.init(),
        other => bail!("Unknown logging.format '{other}' (expected json or pretty)"),
    }
    Ok(())
}
