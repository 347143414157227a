//! Report requests and rendering
//!
//! A report request names what to compute (global totals, global
//! settlements or one user's shared summary) and for which period. Rendering
//! runs the engine on a loaded ledger and writes the matching CSV table.

use crate::core::SettlementEngine;
use crate::io::csv_format::{
    write_settlements_csv, write_shared_summaries_csv, write_user_totals_csv,
};
use crate::types::{LedgerError, Period, SharedSummary, SplitTotals, Transaction, UserId};
use std::io::Write;
use tracing::info;

/// What a report shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Income and expense per user
    Totals,

    /// Net debts between pairs of users
    Settlements,

    /// One user's relationship with each counterpart
    SharedSummary { user: UserId },
}

/// A report over a period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub report: Report,
    pub period: Period,
}

impl ReportRequest {
    pub fn new(report: Report, period: Period) -> Self {
        ReportRequest { report, period }
    }
}

/// Run `request` against `transactions` and write the CSV table to `output`
pub fn render_report(
    engine: &SettlementEngine,
    transactions: &[Transaction],
    request: &ReportRequest,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    info!(
        period = %request.period,
        report = ?request.report,
        transactions = transactions.len(),
        "rendering report"
    );

    match &request.report {
        Report::Totals => {
            let split = split_totals(engine, transactions, request.period);
            write_user_totals_csv(&split.user_totals, output)
        }
        Report::Settlements => {
            let split = split_totals(engine, transactions, request.period);
            write_settlements_csv(&split.settlements, output)
        }
        Report::SharedSummary { user } => {
            let summaries = shared_summary(engine, transactions, user, request.period);
            write_shared_summaries_csv(&summaries, output)
        }
    }
}

fn split_totals(engine: &SettlementEngine, transactions: &[Transaction], period: Period) -> SplitTotals {
    match period {
        Period::Month(month) => engine.compute_monthly_split_totals(transactions, month),
        Period::Year(year) => engine.compute_annual_split_totals(transactions, year),
    }
}

fn shared_summary(
    engine: &SettlementEngine,
    transactions: &[Transaction],
    user: &str,
    period: Period,
) -> Vec<SharedSummary> {
    match period {
        Period::Month(month) => {
            engine.compute_monthly_shared_summary_for_user(transactions, user, month)
        }
        Period::Year(year) => engine.compute_annual_shared_summary_for_user(transactions, user, year),
    }
}
