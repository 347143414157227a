//! Error types for the settlement engine
//!
//! This module defines every error that can surface while loading a ledger
//! and producing a report. The engine itself never fails: over-allocated
//! shares and negative residuals are computed as-is. Errors only arise at the
//! input boundary.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, invalid data types, etc.
//! - **Record Errors**: Invalid enum values, amounts, dates or periods
//! - **Assembly Errors**: Shares that cannot be attached to a transaction

use thiserror::Error;

/// Main error type for the settlement engine
///
/// Each variant carries enough context to point at the offending record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and loading continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A record converted from CSV was rejected
    ///
    /// Wraps the conversion error with the line it came from.
    #[error("Line {line}: {source}")]
    InvalidRecord {
        /// Line number of the rejected record
        line: u64,
        /// Why the record was rejected
        source: Box<LedgerError>,
    },

    /// Invalid transaction type encountered
    #[error("Invalid transaction type '{tx_type}' for transaction {tx}")]
    InvalidTransactionType {
        /// The invalid transaction type string
        tx_type: String,
        /// Transaction ID
        tx: String,
    },

    /// Invalid share rule encountered
    #[error("Invalid share type '{share_type}' for share {share}")]
    InvalidShareType {
        /// The invalid share rule string
        share_type: String,
        /// Share ID
        share: String,
    },

    /// Invalid share status encountered
    #[error("Invalid share status '{status}' for share {share}")]
    InvalidShareStatus {
        /// The invalid status string
        status: String,
        /// Share ID
        share: String,
    },

    /// Amount field is missing for a transaction
    #[error("Transaction {tx} requires an amount")]
    MissingAmount {
        /// Transaction ID
        tx: String,
    },

    /// Invalid amount value (non-positive, negative share value or malformed)
    #[error("Invalid amount '{amount}' for {record}")]
    InvalidAmount {
        /// The invalid amount string
        amount: String,
        /// Record the amount belongs to, e.g. "transaction t1"
        record: String,
    },

    /// Invalid calendar date on a transaction
    #[error("Invalid date '{date}' for transaction {tx}")]
    InvalidDate {
        /// The invalid date string
        date: String,
        /// Transaction ID
        tx: String,
    },

    /// Invalid month or year reference
    ///
    /// This is a fatal error - a report needs a valid period.
    #[error("Invalid period '{period}': expected YYYY-MM or YYYY")]
    InvalidPeriod {
        /// The rejected period text
        period: String,
    },

    /// Share references a transaction that was never loaded
    #[error("Share {share} references unknown transaction {tx}")]
    UnknownTransaction {
        /// Share ID
        share: String,
        /// Referenced transaction ID
        tx: String,
    },

    /// Share participant is the owner of the transaction
    #[error("Share {share} splits transaction {tx} with its own owner {user}")]
    SelfShare {
        /// Share ID
        share: String,
        /// Transaction ID
        tx: String,
        /// The owner's user ID
        user: String,
    },

    /// Participant already has a share on the transaction
    #[error("Transaction {tx} is already shared with user {user}")]
    DuplicateParticipant {
        /// Transaction ID
        tx: String,
        /// Participant user ID
        user: String,
    },

    /// Duplicate transaction ID encountered
    ///
    /// Transaction IDs must be unique. The first occurrence wins.
    #[error("Duplicate transaction ID {tx}")]
    DuplicateTransaction {
        /// Transaction ID that is duplicated
        tx: String,
    },

    /// Derived amounts of a transaction fall outside the decimal range
    ///
    /// The engine skips such a transaction as a whole.
    #[error("Amounts derived from transaction {tx} overflow the decimal range")]
    AmountOverflow {
        /// Transaction ID
        tx: String,
    },

    /// A per-user report was requested without naming the user
    #[error("The {report} report requires a user")]
    MissingUser {
        /// Report name
        report: String,
    },

    /// The async runtime could not be started
    #[error("Failed to create async runtime: {message}")]
    Runtime {
        /// Description of the failure
        message: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Conversion from csv_async::Error to LedgerError
impl From<csv_async::Error> for LedgerError {
    fn from(error: csv_async::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an IoError for a file that could not be opened
    pub fn open_failed(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            LedgerError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            LedgerError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), error),
            }
        }
    }

    /// Attach a line number to a conversion error
    pub fn at_line(self, line: u64) -> Self {
        LedgerError::InvalidRecord {
            line,
            source: Box::new(self),
        }
    }

    /// Create an InvalidTransactionType error
    pub fn invalid_transaction_type(tx_type: &str, tx: &str) -> Self {
        LedgerError::InvalidTransactionType {
            tx_type: tx_type.to_string(),
            tx: tx.to_string(),
        }
    }

    /// Create an InvalidShareType error
    pub fn invalid_share_type(share_type: &str, share: &str) -> Self {
        LedgerError::InvalidShareType {
            share_type: share_type.to_string(),
            share: share.to_string(),
        }
    }

    /// Create an InvalidShareStatus error
    pub fn invalid_share_status(status: &str, share: &str) -> Self {
        LedgerError::InvalidShareStatus {
            status: status.to_string(),
            share: share.to_string(),
        }
    }

    /// Create a MissingAmount error
    pub fn missing_amount(tx: &str) -> Self {
        LedgerError::MissingAmount { tx: tx.to_string() }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, record: &str) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
            record: record.to_string(),
        }
    }

    /// Create an InvalidDate error
    pub fn invalid_date(date: &str, tx: &str) -> Self {
        LedgerError::InvalidDate {
            date: date.to_string(),
            tx: tx.to_string(),
        }
    }

    /// Create an InvalidPeriod error
    pub fn invalid_period(period: &str) -> Self {
        LedgerError::InvalidPeriod {
            period: period.to_string(),
        }
    }

    /// Create an UnknownTransaction error
    pub fn unknown_transaction(share: &str, tx: &str) -> Self {
        LedgerError::UnknownTransaction {
            share: share.to_string(),
            tx: tx.to_string(),
        }
    }

    /// Create a SelfShare error
    pub fn self_share(share: &str, tx: &str, user: &str) -> Self {
        LedgerError::SelfShare {
            share: share.to_string(),
            tx: tx.to_string(),
            user: user.to_string(),
        }
    }

    /// Create a DuplicateParticipant error
    pub fn duplicate_participant(tx: &str, user: &str) -> Self {
        LedgerError::DuplicateParticipant {
            tx: tx.to_string(),
            user: user.to_string(),
        }
    }

    /// Create a DuplicateTransaction error
    pub fn duplicate_transaction(tx: &str) -> Self {
        LedgerError::DuplicateTransaction { tx: tx.to_string() }
    }

    /// Create an AmountOverflow error
    pub fn amount_overflow(tx: &str) -> Self {
        LedgerError::AmountOverflow { tx: tx.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;

    #[rstest]
    #[case::file_not_found(
        LedgerError::FileNotFound { path: "tx.csv".to_string() },
        "File not found: tx.csv"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    #[case::invalid_transaction_type(
        LedgerError::invalid_transaction_type("transfer", "t1"),
        "Invalid transaction type 'transfer' for transaction t1"
    )]
    #[case::invalid_share_type(
        LedgerError::invalid_share_type("half", "s1"),
        "Invalid share type 'half' for share s1"
    )]
    #[case::invalid_amount(
        LedgerError::invalid_amount("-5", "transaction t1"),
        "Invalid amount '-5' for transaction t1"
    )]
    #[case::invalid_period(
        LedgerError::invalid_period("2024-13"),
        "Invalid period '2024-13': expected YYYY-MM or YYYY"
    )]
    #[case::self_share(
        LedgerError::self_share("s1", "t1", "u1"),
        "Share s1 splits transaction t1 with its own owner u1"
    )]
    #[case::amount_overflow(
        LedgerError::amount_overflow("t7"),
        "Amounts derived from transaction t7 overflow the decimal range"
    )]
    #[case::missing_user(
        LedgerError::MissingUser { report: "summary".to_string() },
        "The summary report requires a user"
    )]
    #[case::record_with_line(
        LedgerError::missing_amount("t9").at_line(4),
        "Line 4: Transaction t9 requires an amount"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::unknown_transaction(
        LedgerError::unknown_transaction("s1", "t404"),
        LedgerError::UnknownTransaction { share: "s1".to_string(), tx: "t404".to_string() }
    )]
    #[case::duplicate_participant(
        LedgerError::duplicate_participant("t1", "u2"),
        LedgerError::DuplicateParticipant { tx: "t1".to_string(), user: "u2".to_string() }
    )]
    #[case::duplicate_transaction(
        LedgerError::duplicate_transaction("t1"),
        LedgerError::DuplicateTransaction { tx: "t1".to_string() }
    )]
    fn test_helper_functions(#[case] result: LedgerError, #[case] expected: LedgerError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_open_failed_maps_not_found() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = LedgerError::open_failed(Path::new("missing.csv"), io_error);
        assert_eq!(
            error,
            LedgerError::FileNotFound {
                path: "missing.csv".to_string()
            }
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
