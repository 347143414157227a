//! Per-transaction allocation of amounts between owner and participants
//!
//! This is the single derivation primitive both engine projections are
//! built on. Given a transaction and a share filter it yields each counted
//! participant's portion and the owner's residual.
//!
//! # Rules
//!
//! - `equal`: amount / (counted shares + 1), the extra slice being the owner's
//! - `percentage`: amount * value / 100
//! - `fixed_amount`: value verbatim
//! - a missing value on a non-equal share counts as zero
//! - owner residual = amount - sum of portions, never clamped
//! - a transaction whose amounts overflow the decimal range is rejected
//!
//! The residual closes the sum, so owner plus portions always equals the
//! transaction amount.

use crate::types::{LedgerError, Share, ShareStatus, ShareType, Transaction};
use rust_decimal::Decimal;

/// Which shares take part in money-owed computations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShareFilter {
    /// Only shares the participant accepted
    #[default]
    Accepted,

    /// Every share regardless of status
    All,
}

impl ShareFilter {
    /// Whether a share with `status` is counted
    pub fn admits(&self, status: ShareStatus) -> bool {
        match self {
            ShareFilter::Accepted => status == ShareStatus::Accepted,
            ShareFilter::All => true,
        }
    }
}

/// A participant's derived portion of one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Portion<'a> {
    pub share: &'a Share,
    pub amount: Decimal,
}

impl Portion<'_> {
    pub fn user_id(&self) -> &str {
        &self.share.shared_with_user_id
    }
}

/// A transaction broken down into owner residual and participant portions
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<'a> {
    pub transaction: &'a Transaction,
    pub owner_amount: Decimal,
    pub portions: Vec<Portion<'a>>,
}

impl Allocation<'_> {
    pub fn owner(&self) -> &str {
        &self.transaction.user_id
    }

    /// The portion held by `user`, if they are a counted participant
    pub fn portion_of(&self, user: &str) -> Option<&Portion<'_>> {
        self.portions.iter().find(|p| p.user_id() == user)
    }
}

/// Split a transaction between its owner and the shares `filter` admits
///
/// # Errors
///
/// Returns `AmountOverflow` if a portion, their sum or the owner residual
/// falls outside the decimal range.
pub fn allocate(transaction: &Transaction, filter: ShareFilter) -> Result<Allocation<'_>, LedgerError> {
    let overflow = || LedgerError::amount_overflow(&transaction.id);

    let counted: Vec<&Share> = transaction
        .shares
        .iter()
        .filter(|share| filter.admits(share.status))
        .collect();

    // Owner holds one slice of an equal split
    let equal_slices = Decimal::from(counted.len() + 1);

    let mut portions = Vec::with_capacity(counted.len());
    let mut shared = Decimal::ZERO;

    for share in counted {
        let value = share.share_value.unwrap_or(Decimal::ZERO);
        let amount = match share.share_type {
            ShareType::Equal => transaction.amount.checked_div(equal_slices),
            ShareType::Percentage => percentage_of(transaction.amount, value),
            ShareType::FixedAmount => Some(value),
        }
        .ok_or_else(overflow)?;

        shared = shared.checked_add(amount).ok_or_else(overflow)?;
        portions.push(Portion { share, amount });
    }

    let owner_amount = transaction.amount.checked_sub(shared).ok_or_else(overflow)?;

    Ok(Allocation {
        transaction,
        owner_amount,
        portions,
    })
}

// Scaling the percentage first keeps large but representable results
fn percentage_of(amount: Decimal, percentage: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(percentage)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .or_else(|| {
            percentage
                .checked_div(Decimal::ONE_HUNDRED)
                .and_then(|fraction| amount.checked_mul(fraction))
        })
}
