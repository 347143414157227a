//! Share types
//!
//! A share is one other participant's stake in a transaction, together with
//! the rule used to derive that participant's monetary portion.

use super::transaction::{ShareId, TransactionId, UserId};
use rust_decimal::Decimal;

/// Rule used to derive a participant's portion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareType {
    /// Even split between the owner and every counted participant
    Equal,

    /// Percentage of the transaction amount, on a 0-100 scale
    Percentage,

    /// Absolute amount, independent of the transaction amount
    FixedAmount,
}

impl ShareType {
    /// Parse a case-insensitive rule name
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "equal" => Some(ShareType::Equal),
            "percentage" => Some(ShareType::Percentage),
            "fixed_amount" => Some(ShareType::FixedAmount),
            _ => None,
        }
    }
}

/// Response of the participant to a share invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareStatus {
    Pending,
    Accepted,
    Declined,
}

impl ShareStatus {
    /// Parse a case-insensitive status name
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "pending" => Some(ShareStatus::Pending),
            "accepted" => Some(ShareStatus::Accepted),
            "declined" => Some(ShareStatus::Declined),
            _ => None,
        }
    }
}

/// One participant's portion of a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    /// Unique share identifier
    pub id: ShareId,

    /// The transaction this share splits
    pub transaction_id: TransactionId,

    /// The participant; never the transaction owner
    pub shared_with_user_id: UserId,

    /// How the participant's portion is derived
    pub share_type: ShareType,

    /// Rule parameter
    ///
    /// `None` for equal splits. A percentage (0-100) or an absolute amount
    /// otherwise; a missing value on those rules counts as zero.
    pub share_value: Option<Decimal>,

    /// Invitation status
    pub status: ShareStatus,

    /// Participant display name, denormalized for presentation
    pub shared_with_name: Option<String>,

    /// Participant email, denormalized for presentation
    pub shared_with_email: Option<String>,
}

impl Share {
    pub fn new(
        id: impl Into<ShareId>,
        transaction_id: impl Into<TransactionId>,
        shared_with_user_id: impl Into<UserId>,
        share_type: ShareType,
        share_value: Option<Decimal>,
        status: ShareStatus,
    ) -> Self {
        Share {
            id: id.into(),
            transaction_id: transaction_id.into(),
            shared_with_user_id: shared_with_user_id.into(),
            share_type,
            share_value,
            status,
            shared_with_name: None,
            shared_with_email: None,
        }
    }
}
