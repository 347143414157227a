//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Transactions and identifiers
//! - `share`: Shares splitting a transaction with other users
//! - `period`: Months, years and date ranges
//! - `summary`: Engine outputs (totals, settlements, shared summaries)
//! - `error`: Error types for the settlement engine

pub mod error;
pub mod period;
pub mod share;
pub mod summary;
pub mod transaction;

pub use error::LedgerError;
pub use period::{DateRange, Month, Period, Year};
pub use share::{Share, ShareStatus, ShareType};
pub use summary::{Settlement, SharedSummary, SplitTotals, UserTotals};
pub use transaction::{ShareId, Transaction, TransactionId, TransactionType, UserId};
