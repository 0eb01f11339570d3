//! CSV input/output for batch screening and training data

use crate::error::InputError;
use crate::types::prediction::AnnotatedTransaction;
use crate::types::transaction::{LabeledTransaction, Transaction};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Read unlabeled transactions from CSV with a header row.
///
/// Columns are matched by name; extra columns (such as an existing
/// `isfraud`) are ignored. Every row must pass the entry-form checks.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    read_rows(reader, Transaction::validate)
}

/// Read labeled training rows from CSV with a header row.
pub fn read_labeled<R: Read>(reader: R) -> Result<Vec<LabeledTransaction>> {
    read_rows(reader, |row: &LabeledTransaction| row.transaction().validate())
}

pub fn read_transactions_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let rows = read_transactions(file)
        .with_context(|| format!("Failed to read the CSV file {}", path.display()))?;
    debug!(path = %path.display(), rows = rows.len(), "Batch file loaded");
    Ok(rows)
}

/// Write annotated rows as CSV, header included.
pub fn write_annotated<W: Write>(writer: W, rows: &[AnnotatedTransaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record([
            "sourceid",
            "destinationid",
            "amountofmoney",
            "month",
            "typeofaction",
            "typeoffraud",
            "isfraud",
        ])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_annotated_to_path<P: AsRef<Path>>(path: P, rows: &[AnnotatedTransaction]) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_annotated(file, rows)?;
    debug!(path = %path.display(), rows = rows.len(), "Prediction file written");
    Ok(())
}

fn read_rows<R, T, F>(reader: R, check: F) -> Result<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
    F: Fn(&T) -> Result<(), InputError>,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    rdr.deserialize::<T>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(anyhow::Error::from)
                .and_then(|row| {
                    check(&row)?;
                    Ok(row)
                })
                .with_context(|| format!("Invalid record at data row {}", i + 1))
        })
        .collect()
}
