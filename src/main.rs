//! Split settlement CLI
//!
//! Computes per-user totals, pairwise settlements or one user's shared
//! summary for a month or a year of shared transactions.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --shares shares.csv --month 2024-03 transactions.csv > settlements.csv
//! cargo run -- --shares shares.csv --year 2024 --report totals transactions.csv
//! cargo run -- --shares shares.csv --month 2024-03 --report summary --user u1 transactions.csv
//! cargo run -- --strategy sync --percentage-scale fraction --shares shares.csv --month 2024-03 transactions.csv
//! ```
//!
//! The report is written to stdout as CSV. Diagnostics (skipped rows,
//! dropped shares) go to stderr; set `RUST_LOG=info` or `RUST_LOG=debug` for
//! more detail.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use split_settlement_engine::cli;
use split_settlement_engine::core::SettlementEngine;
use split_settlement_engine::strategy;
use split_settlement_engine::types::LedgerError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), LedgerError> {
    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), config)
    };

    let engine = SettlementEngine::with_config(args.to_engine_config());
    let request = args.to_report_request()?;
    let sources = args.to_input_sources();

    let mut output = std::io::stdout().lock();
    strategy.process(&sources, &engine, &request, &mut output)
}
