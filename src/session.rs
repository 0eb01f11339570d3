//! Interactive screening session.
//!
//! Reads one command per line and drives a single `ModelLifecycle`.
//! User-recoverable failures are printed and the session keeps going.

use crate::batch;
use crate::error::{InputError, LifecycleError};
use crate::lifecycle::ModelLifecycle;
use crate::metrics::SessionMetrics;
use crate::models::backend::ModelBackend;
use crate::types::prediction::{PredictionInput, PredictionResult};
use crate::types::transaction::Transaction;
use anyhow::Result;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, info_span};
use uuid::Uuid;

const HELP: &str = "\
Commands:
  train [path]                     train a model (default: configured data path)
  predict [key=value ...]          classify one transaction
                                   keys: sourceid destinationid amount month action fraud
  batch <input.csv> [output.csv]   classify every row of a CSV file
  status                           show whether a model is trained
  help                             show this message
  quit                             end the session";

/// A parsed session command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Train(Option<PathBuf>),
    Predict(Transaction),
    Batch {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        if verb.starts_with('#') {
            return Ok(None);
        }
        let args: Vec<&str> = words.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "train" => Command::Train(args.first().map(|a| PathBuf::from(*a))),
            "predict" => Command::Predict(parse_transaction(&args)?),
            "batch" => {
                let input = args
                    .first()
                    .map(|a| PathBuf::from(*a))
                    .ok_or(CommandError::MissingArgument("batch", "input CSV path"))?;
                Command::Batch {
                    input,
                    output: args.get(1).map(|a| PathBuf::from(*a)),
                }
            }
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Why a line could not be turned into a command
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("{0} needs an {1}")]
    MissingArgument(&'static str, &'static str),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Build a transaction from `key=value` pairs over the form defaults.
pub fn parse_transaction(pairs: &[&str]) -> Result<Transaction, InputError> {
    let mut tx = Transaction::default();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| InputError::MalformedPair(pair.to_string()))?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        match key.as_str() {
            "sourceid" | "source" => tx.sourceid = parse_number(&key, value)?,
            "destinationid" | "destination" => tx.destinationid = parse_number(&key, value)?,
            "amount" | "amountofmoney" => tx.amountofmoney = parse_number(&key, value)?,
            "month" => tx.month = parse_number(&key, value)?,
            "action" | "typeofaction" => tx.typeofaction = value.parse()?,
            "fraud" | "typeoffraud" => tx.typeoffraud = value.parse()?,
            _ => return Err(InputError::UnknownField(key)),
        }
    }
    tx.validate()?;
    Ok(tx)
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, InputError> {
    value.parse().map_err(|_| InputError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Whether the session should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// One user's screening session
pub struct Session<B: ModelBackend> {
    id: Uuid,
    lifecycle: ModelLifecycle<B>,
    metrics: SessionMetrics,
    default_output: PathBuf,
}

impl<B> Session<B>
where
    B: ModelBackend,
    B::Model: fmt::Display,
{
    pub fn new(lifecycle: ModelLifecycle<B>, default_output: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            lifecycle,
            metrics: SessionMetrics::new(),
            default_output: default_output.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lifecycle(&self) -> &ModelLifecycle<B> {
        &self.lifecycle
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Read commands until end of input or `quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        let span = info_span!("session", id = %self.id);
        let _guard = span.enter();
        info!("Session started");

        writeln!(out, "Money Laundering Prevention System. Type 'help' for commands.")?;
        for line in input.lines() {
            let line = line?;
            let flow = match Command::parse(&line) {
                Ok(Some(command)) => self.execute(command, out)?,
                Ok(None) => Flow::Continue,
                Err(e) => {
                    writeln!(out, "Error: {e}")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Stop {
                break;
            }
        }

        self.metrics.print_summary();
        info!("Session ended");
        Ok(())
    }

    /// Execute one command, writing user-facing messages to `out`.
    ///
    /// Only I/O errors on `out` are returned; everything else is reported.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        match command {
            Command::Train(path) => self.train(path.as_deref(), out)?,
            Command::Predict(tx) => self.predict(tx, out)?,
            Command::Batch { input, output } => {
                let output = output.unwrap_or_else(|| self.default_output.clone());
                self.batch(&input, &output, out)?;
            }
            Command::Status => match self.lifecycle.model() {
                Some(model) => writeln!(out, "Model trained: {model}")?,
                None => writeln!(out, "No model trained yet.")?,
            },
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    fn train<W: Write>(&mut self, path: Option<&Path>, out: &mut W) -> Result<()> {
        let result = self
            .lifecycle
            .train(path)
            .map(|outcome| (outcome.replaced_previous, outcome.model.to_string()));
        match result {
            Ok((replaced_previous, summary)) => {
                self.metrics.record_training(true);
                if replaced_previous {
                    writeln!(out, "Previous model replaced.")?;
                }
                writeln!(out, "Model training completed! {summary}")?;
            }
            Err(e) => {
                self.metrics.record_training(false);
                report(&e, out)?;
            }
        }
        Ok(())
    }

    fn predict<W: Write>(&mut self, tx: Transaction, out: &mut W) -> Result<()> {
        match self.lifecycle.predict(&PredictionInput::Single(tx)) {
            Ok(PredictionResult::Single(label)) => {
                self.metrics.record_prediction(1, usize::from(label.is_fraud()));
                writeln!(out, "The transaction is {label}.")?;
            }
            Ok(PredictionResult::Batch(_)) => {
                writeln!(out, "Error: unexpected batch result for a single transaction")?;
            }
            Err(e) => {
                self.metrics.record_rejection();
                report(&e, out)?;
            }
        }
        Ok(())
    }

    fn batch<W: Write>(&mut self, input: &Path, output: &Path, out: &mut W) -> Result<()> {
        let rows = match batch::read_transactions_from_path(input) {
            Ok(rows) => rows,
            Err(e) => {
                writeln!(out, "Failed to read the CSV file. Error: {e:#}")?;
                return Ok(());
            }
        };

        let result = match self.lifecycle.predict(&PredictionInput::Batch(rows)) {
            Ok(result) => result,
            Err(e) => {
                self.metrics.record_rejection();
                return report(&e, out);
            }
        };
        let fraud = result.fraud_count();
        let PredictionResult::Batch(annotated) = result else {
            writeln!(out, "Error: unexpected single result for a batch")?;
            return Ok(());
        };
        self.metrics.record_prediction(annotated.len(), fraud);

        match batch::write_annotated_to_path(output, &annotated) {
            Ok(()) => {
                info!(
                    input = %input.display(),
                    output = %output.display(),
                    rows = annotated.len(),
                    fraud = fraud,
                    "Batch prediction written"
                );
                writeln!(
                    out,
                    "Predictions written to {} ({} rows, {} flagged as fraud).",
                    output.display(),
                    annotated.len(),
                    fraud
                )?;
            }
            Err(e) => writeln!(out, "Error: {e:#}")?,
        }
        Ok(())
    }
}

/// Print a lifecycle failure the way the user should see it.
fn report<W: Write>(err: &LifecycleError, out: &mut W) -> Result<()> {
    match err {
        LifecycleError::TrainingDataMissing(path) => writeln!(
            out,
            "Training data not found. Ensure \"{}\" exists.",
            path.display()
        )?,
        LifecycleError::ModelNotTrained => writeln!(
            out,
            "Model is not trained yet. Please train the model first."
        )?,
        LifecycleError::Backend(e) => writeln!(out, "Error: training failed: {e:#}")?,
    }
    Ok(())
}
