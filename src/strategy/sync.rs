//! Synchronous processing strategy
//!
//! Streams the transaction file, then the share file, through `SyncReader`
//! on the calling thread and assembles the ledger. Row errors are logged to
//! stderr and processing continues with the next row.

use crate::io::assembly::assemble_transactions;
use crate::io::csv_format::{CsvRow, InputOptions, ShareRow, TransactionRow};
use crate::io::sync_reader::SyncReader;
use crate::strategy::{InputSources, ProcessingStrategy};
use crate::types::{LedgerError, Transaction};
use std::path::Path;
use tracing::{debug, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use split_settlement_engine::core::SettlementEngine;
/// use split_settlement_engine::report::{Report, ReportRequest};
/// use split_settlement_engine::strategy::{InputSources, ProcessingStrategy, SyncProcessingStrategy};
///
/// let sources = InputSources::new("transactions.csv").with_shares("shares.csv");
/// let request = ReportRequest::new(Report::Settlements, "2024-03".parse().unwrap());
/// let mut output = std::io::stdout();
///
/// SyncProcessingStrategy
///     .process(&sources, &SettlementEngine::new(), &request, &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn load(&self, sources: &InputSources) -> Result<Vec<Transaction>, LedgerError> {
        let transactions = read_all::<TransactionRow>(&sources.transactions, sources.options)?;
        let shares = match &sources.shares {
            Some(path) => read_all::<ShareRow>(path, sources.options)?,
            None => Vec::new(),
        };

        Ok(assemble_transactions(transactions, shares).transactions)
    }
}

fn read_all<Row: CsvRow>(path: &Path, options: InputOptions) -> Result<Vec<Row::Record>, LedgerError> {
    let reader = SyncReader::<Row>::new(path, options)?;
    let mut records = Vec::new();

    for result in reader {
        match result {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping record: {}", e),
        }
    }

    debug!(path = %path.display(), records = records.len(), "file loaded");
    Ok(records)
}
