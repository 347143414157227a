//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. The transaction file and the share file are read
//! concurrently in batches on a tokio runtime, then assembled into one ledger.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, worker threads)
//!     ├── AsyncReader<_, TransactionRow> ─┐
//!     ├── AsyncReader<_, ShareRow> ───────┴─ tokio::try_join!
//!     └── assemble_transactions
//! ```
//!
//! Batches within one file are read in order, so the first occurrence of a
//! duplicate transaction id is the same one the sync strategy keeps.

use crate::io::assembly::assemble_transactions;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::{CsvRow, InputOptions, ShareRow, TransactionRow};
use crate::strategy::{InputSources, ProcessingStrategy};
use crate::types::{LedgerError, Transaction};
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, warn};

/// Configuration for batch processing
///
/// Controls how many rows are pulled per batch and the number of worker
/// threads the runtime starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of rows per batch
    pub batch_size: usize,
    /// Number of worker threads the runtime starts
    ///
    /// The two input files are read concurrently and each reads its batches
    /// in order, so at most two batches are in flight whatever this is set to.
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                "Invalid max_concurrent_batches ({}), using default worker thread count ({})",
                max_concurrent_batches, default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Implements the ProcessingStrategy trait by loading both input files
/// concurrently on a multi-threaded tokio runtime.
///
/// # Configuration
///
/// The strategy accepts a BatchConfig with:
/// - `batch_size`: Number of rows per batch (default: 1000)
/// - `max_concurrent_batches`: Number of worker threads (default: CPU cores)
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Load both files on a fresh runtime
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are returned
    /// immediately. Individual row errors are logged and processing continues.
    fn load(&self, sources: &InputSources) -> Result<Vec<Transaction>, LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| LedgerError::Runtime {
                message: e.to_string(),
            })?;

        let batch_size = self.config.batch_size;
        let options = sources.options;

        runtime.block_on(async {
            let transactions = read_all::<TransactionRow>(&sources.transactions, options, batch_size);
            let shares = async {
                match &sources.shares {
                    Some(path) => read_all::<ShareRow>(path, options, batch_size).await,
                    None => Ok(Vec::new()),
                }
            };

            let (transactions, shares) = tokio::try_join!(transactions, shares)?;
            Ok::<_, LedgerError>(assemble_transactions(transactions, shares).transactions)
        })
    }
}

async fn read_all<Row: CsvRow>(
    path: &Path,
    options: InputOptions,
    batch_size: usize,
) -> Result<Vec<Row::Record>, LedgerError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| LedgerError::open_failed(path, e))?;

    let mut reader = AsyncReader::<_, Row>::new(file.compat(), options);
    let mut records = Vec::new();

    loop {
        let batch = reader.read_batch(batch_size).await;
        if batch.is_empty() {
            break;
        }
        records.extend(batch);
    }

    debug!(
        path = %path.display(),
        records = records.len(),
        rejected = reader.rejected().len(),
        "file loaded"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SettlementEngine;
    use crate::io::csv_format::PercentageScale;
    use crate::report::{Report, ReportRequest};
    use crate::strategy::SyncProcessingStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    const TX_HEADER: &str = "id,description,amount,type,user_id,date,category_id\n";
    const SHARE_HEADER: &str = "id,transaction_id,shared_with_user_id,share_type,share_value,status,shared_with_name,shared_with_email\n";

    #[test]
    fn test_async_strategy_processes_shared_expense() {
        let transactions = create_temp_csv(&format!("{}t1,Rent,90,expense,u1,2024-03-01,home\n", TX_HEADER));
        let shares = create_temp_csv(&format!(
            "{}s1,t1,u2,equal,,accepted,,\ns2,t1,u3,equal,,accepted,,\n",
            SHARE_HEADER
        ));
        let sources = InputSources::new(transactions.path()).with_shares(shares.path());
        let request = ReportRequest::new(Report::Settlements, "2024-03".parse().unwrap());
        let mut output = Vec::new();

        let strategy = AsyncProcessingStrategy::new(BatchConfig::default());
        strategy
            .process(&sources, &SettlementEngine::new(), &request, &mut output)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "from,to,amount\nu2,u1,30.0000\nu3,u1,30.0000\n"
        );
    }

    #[test]
    fn test_async_strategy_applies_fraction_scale() {
        let transactions = create_temp_csv(&format!("{}t1,,200,expense,u1,2024-03-01,\n", TX_HEADER));
        let shares = create_temp_csv(&format!("{}s1,t1,u2,percentage,0.25,accepted,,\n", SHARE_HEADER));
        let sources = InputSources::new(transactions.path())
            .with_shares(shares.path())
            .with_options(InputOptions {
                percentage_scale: PercentageScale::Fraction,
            });

        let ledger = AsyncProcessingStrategy::new(BatchConfig::default())
            .load(&sources)
            .unwrap();

        assert_eq!(ledger[0].shares[0].share_value, Some(rust_decimal::Decimal::from(25)));
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let sources = InputSources::new("nonexistent.csv");
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default());

        let result = strategy.load(&sources);
        assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
    }

    #[test]
    fn test_async_strategy_matches_sync_across_batches() {
        // Small batches force several reads per file, including a duplicate id
        let transactions = create_temp_csv(&format!(
            "{}t1,,100,expense,u1,2024-03-01,\n\
             t2,,40,income,u2,2024-03-02,\n\
             t1,,999,expense,u3,2024-03-03,\n\
             t3,,60,expense,u3,2024-03-04,\n\
             t4,,10,expense,u2,2024-04-01,\n",
            TX_HEADER
        ));
        let shares = create_temp_csv(&format!(
            "{}s1,t1,u2,percentage,30,accepted,,\n\
             s2,t2,u1,fixed_amount,15,accepted,,\n\
             s3,t3,u1,equal,,accepted,,\n\
             s4,t3,u2,equal,,pending,,\n",
            SHARE_HEADER
        ));
        let sources = InputSources::new(transactions.path()).with_shares(shares.path());

        let async_ledger = AsyncProcessingStrategy::new(BatchConfig::new(2, 2))
            .load(&sources)
            .unwrap();
        let sync_ledger = SyncProcessingStrategy.load(&sources).unwrap();

        assert_eq!(async_ledger, sync_ledger);
        assert_eq!(async_ledger.len(), 4);
        assert_eq!(async_ledger[0].amount, rust_decimal::Decimal::from(100));
    }

    #[test]
    fn test_batch_config_zero_values_fall_back() {
        let config = BatchConfig::new(0, 0);
        assert_eq!(config, BatchConfig::default());
    }
}
