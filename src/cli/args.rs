use crate::core::{EngineConfig, ShareFilter};
use crate::io::csv_format::{InputOptions, PercentageScale};
use crate::report::{Report, ReportRequest};
use crate::strategy::{BatchConfig, InputSources};
use crate::types::{LedgerError, Month, Period, UserId, Year};
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// Settle shared expenses and incomes between users
#[derive(Parser, Debug)]
#[command(name = "split-settlement")]
#[command(about = "Compute per-user totals and pairwise settlements for shared transactions", long_about = None)]
#[command(group(ArgGroup::new("period").required(true).args(["month", "year"])))]
pub struct CliArgs {
    /// Input CSV file path containing transaction records
    #[arg(value_name = "TRANSACTIONS", help = "Path to the transactions CSV file")]
    pub transactions_file: PathBuf,

    /// Input CSV file path containing share records
    #[arg(long = "shares", value_name = "SHARES", help = "Path to the shares CSV file")]
    pub shares_file: Option<PathBuf>,

    /// Month to report on
    #[arg(long = "month", value_name = "YYYY-MM")]
    pub month: Option<Month>,

    /// Year to report on
    #[arg(long = "year", value_name = "YYYY")]
    pub year: Option<Year>,

    /// Report to produce
    #[arg(
        long = "report",
        value_name = "REPORT",
        default_value = "settlements",
        help = "Report: 'totals', 'settlements' or 'summary'"
    )]
    pub report: ReportKind,

    /// User whose shared summary is produced
    #[arg(
        long = "user",
        value_name = "USER_ID",
        required_if_eq("report", "summary"),
        help = "Current user for the summary report"
    )]
    pub user: Option<UserId>,

    /// Count pending and declined shares as well as accepted ones
    #[arg(long = "include-unaccepted")]
    pub include_unaccepted: bool,

    /// Scale of percentage share values in the shares file
    #[arg(
        long = "percentage-scale",
        value_name = "SCALE",
        default_value = "percent",
        help = "Percentage values as 'percent' (0-100) or 'fraction' (0-1)"
    )]
    pub percentage_scale: ScaleArg,

    /// Parsing strategy to use for loading the ledger
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Parsing strategy: 'sync' for synchronous or 'async' for asynchronous"
    )]
    pub strategy: StrategyType,

    /// Number of rows per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of rows per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads for the async runtime (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,
}

/// Available parsing strategies for CSV processing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Totals,
    Settlements,
    Summary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScaleArg {
    Percent,
    Fraction,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values are replaced by
    /// the defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    pub fn to_input_sources(&self) -> InputSources {
        let percentage_scale = match self.percentage_scale {
            ScaleArg::Percent => PercentageScale::Percent,
            ScaleArg::Fraction => PercentageScale::Fraction,
        };

        let sources = InputSources::new(&self.transactions_file)
            .with_options(InputOptions { percentage_scale });
        match &self.shares_file {
            Some(shares) => sources.with_shares(shares),
            None => sources,
        }
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            share_filter: if self.include_unaccepted {
                ShareFilter::All
            } else {
                ShareFilter::Accepted
            },
        }
    }

    /// Build the report request
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` if neither a month nor a year was given, and
    /// `MissingUser` if a summary is requested without `user`. Clap enforces
    /// both for parsed arguments; the checks cover hand-built ones.
    pub fn to_report_request(&self) -> Result<ReportRequest, LedgerError> {
        let period = match (self.month, self.year) {
            (Some(month), _) => Period::Month(month),
            (None, Some(year)) => Period::Year(year),
            (None, None) => return Err(LedgerError::invalid_period("")),
        };

        let report = match self.report {
            ReportKind::Totals => Report::Totals,
            ReportKind::Settlements => Report::Settlements,
            ReportKind::Summary => Report::SharedSummary {
                user: self.user.clone().ok_or_else(|| LedgerError::MissingUser {
                    report: "summary".to_string(),
                })?,
            },
        };

        Ok(ReportRequest::new(report, period))
    }
}
