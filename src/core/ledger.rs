//! Pairwise debt ledger
//!
//! Accumulates raw directed amounts (`debtor` owes `creditor`) across all
//! shared transactions of a period, then nets every unordered pair into at
//! most one settlement. There is no multi-party simplification: A owing B
//! and B owing C stay two settlements.

use crate::types::{Settlement, UserId};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Directed raw balances between users
///
/// Nested ordered maps keep iteration deterministic and allow lookups by
/// `&str` without allocating keys.
#[derive(Debug, Clone, Default)]
pub struct DebtLedger {
    /// debtor -> creditor -> raw amount owed
    owed: BTreeMap<UserId, BTreeMap<UserId, Decimal>>,
}

impl DebtLedger {
    pub fn new() -> Self {
        DebtLedger {
            owed: BTreeMap::new(),
        }
    }

    /// Record the debts of one transaction, each `(debtor, creditor, amount)`
    ///
    /// Entries where both sides are the same user are dropped, so the
    /// ledger can never produce a self-settlement. Either every entry is
    /// recorded or, when a raw amount or a pair's net would leave the decimal
    /// range, none is and `false` is returned.
    pub fn try_record(&mut self, debts: &[(&str, &str, Decimal)]) -> bool {
        let mut staged: BTreeMap<(&str, &str), Decimal> = BTreeMap::new();

        for &(debtor, creditor, amount) in debts {
            if debtor == creditor {
                continue;
            }
            let current = match staged.get(&(debtor, creditor)) {
                Some(total) => *total,
                None => self.owed(debtor, creditor),
            };
            match current.checked_add(amount) {
                Some(total) => staged.insert((debtor, creditor), total),
                None => return false,
            };
        }

        for (&(debtor, creditor), total) in &staged {
            let reverse = match staged.get(&(creditor, debtor)) {
                Some(reverse) => *reverse,
                None => self.owed(creditor, debtor),
            };
            if total.checked_sub(reverse).is_none() {
                return false;
            }
        }

        for ((debtor, creditor), total) in staged {
            self.owed
                .entry(debtor.to_string())
                .or_default()
                .insert(creditor.to_string(), total);
        }
        true
    }

    /// Raw amount recorded from `debtor` to `creditor`, before netting
    pub fn owed(&self, debtor: &str, creditor: &str) -> Decimal {
        self.owed
            .get(debtor)
            .and_then(|creditors| creditors.get(creditor))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Net amount `a` owes `b`; negative when `b` owes `a`
    ///
    /// `try_record` only commits totals whose pairwise difference fits.
    pub fn net(&self, a: &str, b: &str) -> Decimal {
        self.owed(a, b) - self.owed(b, a)
    }

    /// Net every pair that has recorded debt into settlements
    ///
    /// Pairs are visited in (lower ID, higher ID) order. A pair whose debts
    /// cancel out produces nothing.
    pub fn settlements(&self) -> Vec<Settlement> {
        let pairs: BTreeSet<(&str, &str)> = self
            .owed
            .iter()
            .flat_map(|(debtor, creditors)| {
                creditors.keys().map(move |creditor| {
                    let (debtor, creditor) = (debtor.as_str(), creditor.as_str());
                    if debtor < creditor {
                        (debtor, creditor)
                    } else {
                        (creditor, debtor)
                    }
                })
            })
            .collect();

        pairs
            .into_iter()
            .filter_map(|(a, b)| {
                let net = self.net(a, b);
                if net > Decimal::ZERO {
                    Some(Settlement::new(a, b, net))
                } else if net < Decimal::ZERO {
                    Some(Settlement::new(b, a, -net))
                } else {
                    None
                }
            })
            .collect()
    }
}
