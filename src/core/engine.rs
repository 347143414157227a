//! Settlement engine
//!
//! This module provides the `SettlementEngine`, which turns a snapshot of
//! transactions into either a global view of a period (per-user totals and
//! pairwise settlements) or the view of one reference user (one summary per
//! counterpart).
//!
//! Both views are projections of the same allocation primitive, so share
//! status filtering, percentage handling and sign conventions cannot drift
//! apart between them.
//!
//! # Sign convention
//!
//! A `SharedSummary::balance` is positive when the counterpart owes the
//! reference user. It always equals the net of the global settlement
//! between the same two users.
//!
//! # Overflow
//!
//! A transaction whose amounts cannot be allocated or accumulated within the
//! decimal range is logged and skipped as a whole. Nothing it would have
//! contributed reaches totals, settlements or summaries.

use crate::core::allocation::{allocate, Allocation, Portion, ShareFilter};
use crate::core::ledger::DebtLedger;
use crate::types::{
    DateRange, LedgerError, Month, SharedSummary, SplitTotals, Transaction, TransactionType,
    UserTotals, Year,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Engine configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Which shares count toward totals and settlements
    pub share_filter: ShareFilter,
}

/// Stateless settlement engine
///
/// Each call is an independent computation over the supplied slice; inputs
/// are never mutated and nothing is retained between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine {
    config: EngineConfig,
}

impl SettlementEngine {
    /// Create an engine with the default configuration
    ///
    /// Only accepted shares are counted.
    pub fn new() -> Self {
        SettlementEngine {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        SettlementEngine { config }
    }

    /// Compute per-user totals and settlements for one month
    ///
    /// Transactions dated outside the month are ignored together with their
    /// shares.
    pub fn compute_monthly_split_totals(
        &self,
        transactions: &[Transaction],
        month: Month,
    ) -> SplitTotals {
        self.compute_split_totals(transactions, month.range())
    }

    /// Compute per-user totals and settlements for one calendar year
    pub fn compute_annual_split_totals(
        &self,
        transactions: &[Transaction],
        year: Year,
    ) -> SplitTotals {
        self.compute_split_totals(transactions, year.range())
    }

    /// Compute per-user totals and settlements for an inclusive date range
    ///
    /// Every party's derived amount (owner residual included) lands in their
    /// income or expense total. Each participant then owes the owner their
    /// portion of an expense, or is owed their portion of an income. Debts are
    /// netted per pair of users.
    pub fn compute_split_totals(&self, transactions: &[Transaction], range: DateRange) -> SplitTotals {
        let mut user_totals: BTreeMap<String, UserTotals> = BTreeMap::new();
        let mut ledger = DebtLedger::new();
        let mut included = 0usize;

        for allocation in self.allocations_in(transactions, range) {
            match apply_split(&allocation, &mut user_totals, &mut ledger) {
                Ok(()) => included += 1,
                Err(e) => warn!("Skipping transaction: {}", e),
            }
        }

        let settlements = ledger.settlements();

        debug!(
            transactions = transactions.len(),
            included,
            users = user_totals.len(),
            settlements = settlements.len(),
            "computed split totals for {} to {}",
            range.start,
            range.end
        );

        SplitTotals {
            user_totals,
            settlements,
        }
    }

    /// Summarise a user's shared relationships for one month
    pub fn compute_monthly_shared_summary_for_user(
        &self,
        transactions: &[Transaction],
        current_user: &str,
        month: Month,
    ) -> Vec<SharedSummary> {
        self.compute_shared_summary_for_user(transactions, current_user, month.range())
    }

    /// Summarise a user's shared relationships for one calendar year
    pub fn compute_annual_shared_summary_for_user(
        &self,
        transactions: &[Transaction],
        current_user: &str,
        year: Year,
    ) -> Vec<SharedSummary> {
        self.compute_shared_summary_for_user(transactions, current_user, year.range())
    }

    /// Summarise a user's shared relationships over an inclusive date range
    ///
    /// Returns one entry per counterpart, ordered by counterpart ID. Only
    /// pairs that include `current_user` are considered: their own
    /// transactions split with others, and transactions of others where
    /// `current_user` holds a counted share.
    pub fn compute_shared_summary_for_user(
        &self,
        transactions: &[Transaction],
        current_user: &str,
        range: DateRange,
    ) -> Vec<SharedSummary> {
        let mut summaries: BTreeMap<String, SharedSummary> = BTreeMap::new();

        for allocation in self.allocations_in(transactions, range) {
            if let Err(e) = apply_summary(&allocation, current_user, &mut summaries) {
                warn!("Skipping transaction: {}", e);
            }
        }

        debug!(
            user = current_user,
            counterparts = summaries.len(),
            "computed shared summary for {} to {}",
            range.start,
            range.end
        );

        summaries.into_values().collect()
    }

    fn allocations_in<'a>(
        &self,
        transactions: &'a [Transaction],
        range: DateRange,
    ) -> impl Iterator<Item = Allocation<'a>> {
        let filter = self.config.share_filter;
        transactions
            .iter()
            .filter(move |tx| range.contains(tx.date))
            .filter_map(move |tx| match allocate(tx, filter) {
                Ok(allocation) => Some(allocation),
                Err(e) => {
                    warn!("Skipping transaction: {}", e);
                    None
                }
            })
    }
}

/// Fold one allocation into the per-user totals and the debt ledger
///
/// Totals are staged and only committed once the ledger accepted the
/// transaction's debts, so a failure leaves both untouched.
fn apply_split(
    allocation: &Allocation<'_>,
    user_totals: &mut BTreeMap<String, UserTotals>,
    ledger: &mut DebtLedger,
) -> Result<(), LedgerError> {
    let overflow = || LedgerError::amount_overflow(&allocation.transaction.id);
    let tx_type = allocation.transaction.tx_type;
    let owner = allocation.owner();

    let parties = std::iter::once((owner, allocation.owner_amount))
        .chain(allocation.portions.iter().map(|p| (p.user_id(), p.amount)));

    let mut staged: BTreeMap<&str, UserTotals> = BTreeMap::new();
    for (user, amount) in parties {
        let current = match staged.get(user) {
            Some(totals) => *totals,
            None => user_totals.get(user).copied().unwrap_or_default(),
        };
        let updated = current.checked_add(tx_type, amount).ok_or_else(overflow)?;
        staged.insert(user, updated);
    }

    let debts: Vec<(&str, &str, Decimal)> = allocation
        .portions
        .iter()
        .map(|portion| match tx_type {
            TransactionType::Expense => (portion.user_id(), owner, portion.amount),
            TransactionType::Income => (owner, portion.user_id(), portion.amount),
        })
        .collect();

    if !ledger.try_record(&debts) {
        return Err(overflow());
    }

    for (user, totals) in staged {
        user_totals.insert(user.to_string(), totals);
    }
    Ok(())
}

/// Fold one allocation into `current_user`'s per-counterpart summaries
///
/// All-or-nothing like `apply_split`.
fn apply_summary(
    allocation: &Allocation<'_>,
    current_user: &str,
    summaries: &mut BTreeMap<String, SharedSummary>,
) -> Result<(), LedgerError> {
    let overflow = || LedgerError::amount_overflow(&allocation.transaction.id);
    let tx_type = allocation.transaction.tx_type;
    let sign = owed_to_owner(tx_type);

    // (counterpart, portion, sign of what the counterpart owes current_user)
    let entries: Vec<(&str, &Portion<'_>, Decimal)> = if allocation.owner() == current_user {
        allocation
            .portions
            .iter()
            .filter(|portion| portion.user_id() != current_user)
            .map(|portion| (portion.user_id(), portion, sign))
            .collect()
    } else if let Some(portion) = allocation.portion_of(current_user) {
        vec![(allocation.owner(), portion, -sign)]
    } else {
        Vec::new()
    };

    let mut staged: BTreeMap<&str, SharedSummary> = BTreeMap::new();
    for (counterpart, portion, sign) in entries {
        let current = match staged.remove(counterpart) {
            Some(summary) => summary,
            None => summaries
                .get(counterpart)
                .cloned()
                .unwrap_or_else(|| SharedSummary::new(counterpart)),
        };
        let mut updated = accumulate(current, tx_type, portion.amount, sign).ok_or_else(overflow)?;

        // Contact details come from the counterpart's own share
        if portion.user_id() == counterpart {
            if updated.name.is_none() {
                updated.name = portion.share.shared_with_name.clone();
            }
            if updated.email.is_none() {
                updated.email = portion.share.shared_with_email.clone();
            }
        }
        staged.insert(counterpart, updated);
    }

    for (counterpart, summary) in staged {
        summaries.insert(counterpart.to_string(), summary);
    }
    Ok(())
}

/// Sign of a participant's debt toward the owner for a transaction type
///
/// Participants owe the owner their part of an expense; the owner owes
/// participants their part of an income.
fn owed_to_owner(tx_type: TransactionType) -> Decimal {
    match tx_type {
        TransactionType::Expense => Decimal::ONE,
        TransactionType::Income => Decimal::NEGATIVE_ONE,
    }
}

fn accumulate(
    mut summary: SharedSummary,
    tx_type: TransactionType,
    amount: Decimal,
    sign: Decimal,
) -> Option<SharedSummary> {
    match tx_type {
        TransactionType::Income => summary.income = summary.income.checked_add(amount)?,
        TransactionType::Expense => summary.expense = summary.expense.checked_add(amount)?,
    }
    summary.balance = summary.balance.checked_add(amount.checked_mul(sign)?)?;
    Some(summary)
}

/// Compute per-user totals and settlements for one month with the default engine
pub fn compute_monthly_split_totals(transactions: &[Transaction], month: Month) -> SplitTotals {
    SettlementEngine::new().compute_monthly_split_totals(transactions, month)
}

/// Summarise `current_user`'s shared relationships for one month with the default engine
pub fn compute_monthly_shared_summary_for_user(
    transactions: &[Transaction],
    current_user: &str,
    month: Month,
) -> Vec<SharedSummary> {
    SettlementEngine::new().compute_monthly_shared_summary_for_user(transactions, current_user, month)
}
