//! Assembly of loaded rows into transactions with their shares
//!
//! Transactions and shares arrive as two independent row streams. This
//! module attaches every share to its parent transaction and enforces the
//! ledger shape the engine relies on:
//!
//! - transaction IDs are unique (first occurrence wins)
//! - a share references a loaded transaction
//! - a share never splits a transaction with its own owner
//! - a transaction has at most one share per participant
//!
//! Rejected rows are collected and logged; they never abort the load.

use crate::types::{LedgerError, Share, Transaction};
use std::collections::HashMap;
use tracing::{info, warn};

/// Result of assembling a ledger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledLedger {
    /// Transactions in input order, each carrying its accepted shares
    pub transactions: Vec<Transaction>,

    /// Rows that were dropped, with the reason
    pub rejected: Vec<LedgerError>,
}

/// Attach `shares` to `transactions`
pub fn assemble_transactions(transactions: Vec<Transaction>, shares: Vec<Share>) -> AssembledLedger {
    let mut ledger = AssembledLedger {
        transactions: Vec::with_capacity(transactions.len()),
        rejected: Vec::new(),
    };
    let mut index: HashMap<String, usize> = HashMap::with_capacity(transactions.len());

    for transaction in transactions {
        if index.contains_key(&transaction.id) {
            reject(&mut ledger, LedgerError::duplicate_transaction(&transaction.id));
            continue;
        }
        index.insert(transaction.id.clone(), ledger.transactions.len());
        ledger.transactions.push(transaction);
    }

    let share_count = shares.len();
    for share in shares {
        let Some(&position) = index.get(&share.transaction_id) else {
            reject(
                &mut ledger,
                LedgerError::unknown_transaction(&share.id, &share.transaction_id),
            );
            continue;
        };
        let transaction = &mut ledger.transactions[position];

        if share.shared_with_user_id == transaction.user_id {
            let error = LedgerError::self_share(&share.id, &transaction.id, &transaction.user_id);
            reject(&mut ledger, error);
            continue;
        }

        if transaction
            .shares
            .iter()
            .any(|existing| existing.shared_with_user_id == share.shared_with_user_id)
        {
            let error = LedgerError::duplicate_participant(&transaction.id, &share.shared_with_user_id);
            reject(&mut ledger, error);
            continue;
        }

        transaction.shares.push(share);
    }

    info!(
        transactions = ledger.transactions.len(),
        shares = share_count,
        rejected = ledger.rejected.len(),
        "ledger assembled"
    );

    ledger
}

fn reject(ledger: &mut AssembledLedger, error: LedgerError) {
    warn!("Skipping record: {}", error);
    ledger.rejected.push(error);
}
