//! Core business logic module
//!
//! This module contains the settlement computation components:
//! - `allocation` - Per-transaction split between owner and participants
//! - `ledger` - Pairwise debt accumulation and netting
//! - `engine` - The two projections: global totals/settlements and per-user summaries

pub mod allocation;
pub mod engine;
pub mod ledger;

pub use allocation::{allocate, Allocation, Portion, ShareFilter};
pub use engine::{
    compute_monthly_shared_summary_for_user, compute_monthly_split_totals, EngineConfig,
    SettlementEngine,
};
pub use ledger::DebtLedger;
