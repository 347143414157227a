//! Output types produced by the settlement engine
//!
//! These records are derived per invocation and never stored.

use super::transaction::{TransactionType, UserId};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Income and expense attributed to one user over a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl UserTotals {
    /// Totals with `amount` added to the side matching `tx_type`
    ///
    /// Returns `None` if either side or the net would leave the decimal range.
    pub fn checked_add(self, tx_type: TransactionType, amount: Decimal) -> Option<UserTotals> {
        let mut totals = self;
        match tx_type {
            TransactionType::Income => totals.income = totals.income.checked_add(amount)?,
            TransactionType::Expense => totals.expense = totals.expense.checked_add(amount)?,
        }
        totals.income.checked_sub(totals.expense)?;
        Some(totals)
    }

    /// Income minus expense
    ///
    /// Totals built through `checked_add` always have a representable net.
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Net debt between two users: `from` owes `to` `amount`
///
/// `amount` is always strictly positive and `from` never equals `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub from: UserId,
    pub to: UserId,
    pub amount: Decimal,
}

impl Settlement {
    pub fn new(from: impl Into<UserId>, to: impl Into<UserId>, amount: Decimal) -> Self {
        Settlement {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

/// Global view of a period: per-user totals plus pairwise settlements
///
/// `user_totals` is sparse and ordered by user ID. `settlements` holds at
/// most one entry per unordered pair of users, ordered by that pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitTotals {
    pub user_totals: BTreeMap<UserId, UserTotals>,
    pub settlements: Vec<Settlement>,
}

/// One counterpart's relationship with a reference user over a period
///
/// `income` and `expense` add up the amounts shared between the two users.
/// `balance` is positive when the counterpart owes the reference user and
/// negative when the reference user owes the counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSummary {
    pub user_id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

impl SharedSummary {
    /// Create an empty summary for a counterpart
    pub fn new(user_id: impl Into<UserId>) -> Self {
        SharedSummary {
            user_id: user_id.into(),
            name: None,
            email: None,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }
}
