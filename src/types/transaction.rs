//! Transaction-related types for the settlement engine
//!
//! This module defines the transaction record and the identifiers used
//! throughout the system. A transaction belongs to its owning user and may
//! carry any number of shares splitting it with other users.

use super::share::Share;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// User identifier
///
/// Opaque text, typically a UUID issued by the account system.
pub type UserId = String;

/// Transaction identifier
pub type TransactionId = String;

/// Share identifier
pub type ShareId = String;

/// Direction of money for a transaction
///
/// The type decides both which total a party's amount lands in and the
/// direction of debt between owner and participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Money received by the owner
    ///
    /// When shared, the owner received money on the participants' behalf
    /// and owes each participant their portion.
    Income,

    /// Money spent by the owner
    ///
    /// When shared, each participant owes the owner their portion.
    Expense,
}

impl TransactionType {
    /// Parse a case-insensitive type name
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

/// A recorded income or expense with its attached shares
///
/// The engine treats transactions as immutable snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: TransactionId,

    /// Free-form description entered by the owner
    pub description: String,

    /// Transaction amount, strictly positive
    pub amount: Decimal,

    /// Income or expense
    pub tx_type: TransactionType,

    /// The owner: payer or recipient of record
    pub user_id: UserId,

    /// Calendar date the transaction occurred on
    pub date: NaiveDate,

    /// Optional category reference
    pub category_id: Option<String>,

    /// Shares splitting this transaction with other users
    pub shares: Vec<Share>,
}

impl Transaction {
    /// Create an unshared transaction
    pub fn new(
        id: impl Into<TransactionId>,
        tx_type: TransactionType,
        user_id: impl Into<UserId>,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Transaction {
            id: id.into(),
            description: String::new(),
            amount,
            tx_type,
            user_id: user_id.into(),
            date,
            category_id: None,
            shares: Vec::new(),
        }
    }

    /// Attach a share, returning the transaction for chaining
    pub fn with_share(mut self, share: Share) -> Self {
        self.shares.push(share);
        self
    }
}
