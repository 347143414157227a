//! Split Settlement Engine Library
//! # Overview
//!
//! This library settles shared expenses and incomes between users. Every
//! transaction has an owner and may be shared with other users; each share
//! derives a participant's portion (equal split, percentage or fixed amount).
//! From those portions the engine computes, for a month or a year:
//!
//! - per-user income and expense totals, plus the minimal net debt between
//!   every pair of users ([`core::SettlementEngine::compute_monthly_split_totals`])
//! - one user's relationship with each counterpart
//!   ([`core::SettlementEngine::compute_monthly_shared_summary_for_user`])
//!
//! Both projections come from the same allocation rule ([`core::allocate`]),
//! so a user's summary balances always agree with the global settlements.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Transaction, Share, periods, results, errors)
//! - [`core`] - Business logic components:
//!   - [`core::allocation`] - Per-transaction split between owner and participants
//!   - [`core::ledger`] - Pairwise debt netting
//!   - [`core::engine`] - The settlement projections
//! - [`io`] - CSV rows, sync and async readers, share assembly, report writers
//! - [`strategy`] - Sync and async pipelines from files to a written report
//! - [`report`] - Report requests and rendering
//! - [`cli`] - CLI arguments parsing
//!
//! # Sign Convention
//!
//! In a shared summary, a positive balance means the counterpart owes the
//! current user; a negative balance means the current user owes the
//! counterpart.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod report;
pub mod strategy;
pub mod types;

pub use core::{
    compute_monthly_shared_summary_for_user, compute_monthly_split_totals, EngineConfig,
    SettlementEngine, ShareFilter,
};
pub use report::{render_report, Report, ReportRequest};
pub use types::{
    LedgerError, Month, Period, Settlement, Share, ShareStatus, ShareType, SharedSummary,
    SplitTotals, Transaction, TransactionType, UserId, UserTotals, Year,
};
