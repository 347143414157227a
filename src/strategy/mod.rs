//! Processing strategy module
//!
//! This module defines the Strategy pattern for complete report pipelines:
//! loading the transaction and share files, assembling the ledger, running
//! the settlement engine and writing the report. Loading is the part that
//! differs (synchronous or asynchronous batch reading), so strategies
//! implement `load` and inherit `process`.

use crate::cli::StrategyType;
use crate::core::SettlementEngine;
use crate::io::csv_format::InputOptions;
use crate::report::{render_report, ReportRequest};
use crate::types::{LedgerError, Transaction};
use std::io::Write;
use std::path::PathBuf;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Files a ledger is loaded from
#[derive(Debug, Clone, PartialEq)]
pub struct InputSources {
    /// Transaction CSV
    pub transactions: PathBuf,

    /// Share CSV; without it every transaction is unshared
    pub shares: Option<PathBuf>,

    /// Conversion options applied to every row
    pub options: InputOptions,
}

impl InputSources {
    pub fn new(transactions: impl Into<PathBuf>) -> Self {
        InputSources {
            transactions: transactions.into(),
            shares: None,
            options: InputOptions::default(),
        }
    }

    pub fn with_shares(mut self, shares: impl Into<PathBuf>) -> Self {
        self.shares = Some(shares.into());
        self
    }

    pub fn with_options(mut self, options: InputOptions) -> Self {
        self.options = options;
        self
    }
}

/// Processing strategy trait for complete report pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Load and assemble the ledger described by `sources`
    ///
    /// # Errors
    ///
    /// Returns an error if an input file cannot be opened or read. Malformed
    /// rows and inconsistent shares are logged and skipped instead.
    fn load(&self, sources: &InputSources) -> Result<Vec<Transaction>, LedgerError>;

    /// Load the ledger, run `request` and write the report to `output`
    fn process(
        &self,
        sources: &InputSources,
        engine: &SettlementEngine,
        request: &ReportRequest,
        output: &mut dyn Write,
    ) -> Result<(), LedgerError> {
        let transactions = self.load(sources)?;
        render_report(engine, &transactions, request, output)
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch reading (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
