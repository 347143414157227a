use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use split_settlement_engine::core::{allocate, EngineConfig, SettlementEngine, ShareFilter};
use split_settlement_engine::io::assemble_transactions;
use split_settlement_engine::types::{
    Month, Share, ShareStatus, ShareType, SplitTotals, Transaction, TransactionType,
};
use std::collections::BTreeSet;

const USERS: [&str; 5] = ["u0", "u1", "u2", "u3", "u4"];

fn tolerance() -> Decimal {
    Decimal::new(1, 4)
}

fn march() -> Month {
    Month::new(2024, 3).expect("valid month")
}

/// (owner, amount in cents, is income, day of March, shares)
type TxSpec = (usize, u32, bool, u32, Vec<ShareSpec>);
/// (participant, rule, value, status)
type ShareSpec = (usize, u8, u32, u8);

fn share_spec() -> impl Strategy<Value = ShareSpec> {
    (0usize..USERS.len(), 0u8..3, 0u32..=6_000, 0u8..3)
}

fn tx_spec() -> impl Strategy<Value = TxSpec> {
    (
        0usize..USERS.len(),
        1u32..=1_000_000,
        any::<bool>(),
        1u32..=31,
        prop::collection::vec(share_spec(), 0..=4),
    )
}

/// Build transactions the way the loader does, so self-shares and duplicate
/// participants are dropped before the engine sees them.
fn build_ledger(specs: &[TxSpec]) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(specs.len());
    let mut shares = Vec::new();

    for (idx, (owner, cents, income, day, share_specs)) in specs.iter().enumerate() {
        let tx_id = format!("t{}", idx);
        let tx_type = if *income {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, *day).expect("valid day");
        transactions.push(Transaction::new(
            tx_id.clone(),
            tx_type,
            USERS[*owner],
            Decimal::new(i64::from(*cents), 2),
            date,
        ));

        for (share_idx, (participant, rule, value, status)) in share_specs.iter().enumerate() {
            let (share_type, share_value) = match rule {
                0 => (ShareType::Equal, None),
                // 0.00% to 30.00%, so four shares never exceed the whole amount
                1 => (ShareType::Percentage, Some(Decimal::new(i64::from(*value % 3_001), 2))),
                _ => (ShareType::FixedAmount, Some(Decimal::new(i64::from(*value), 2))),
            };
            let status = match status {
                0 => ShareStatus::Accepted,
                1 => ShareStatus::Pending,
                _ => ShareStatus::Declined,
            };
            shares.push(Share::new(
                format!("{}-s{}", tx_id, share_idx),
                tx_id.clone(),
                USERS[*participant],
                share_type,
                share_value,
                status,
            ));
        }
    }

    assemble_transactions(transactions, shares).transactions
}

fn engine(include_unaccepted: bool) -> SettlementEngine {
    SettlementEngine::with_config(EngineConfig {
        share_filter: if include_unaccepted {
            ShareFilter::All
        } else {
            ShareFilter::Accepted
        },
    })
}

/// Net amount `debtor` owes `creditor` according to the settlements
fn settled(totals: &SplitTotals, debtor: &str, creditor: &str) -> Decimal {
    totals
        .settlements
        .iter()
        .map(|s| {
            if s.from == debtor && s.to == creditor {
                s.amount
            } else if s.from == creditor && s.to == debtor {
                -s.amount
            } else {
                Decimal::ZERO
            }
        })
        .sum()
}

proptest! {
    #[test]
    fn totals_conserve_transaction_amounts(
        specs in prop::collection::vec(tx_spec(), 0..=25),
        include_unaccepted in any::<bool>(),
    ) {
        let ledger = build_ledger(&specs);
        let totals = engine(include_unaccepted).compute_monthly_split_totals(&ledger, march());

        let income: Decimal = ledger
            .iter()
            .filter(|tx| tx.tx_type == TransactionType::Income)
            .map(|tx| tx.amount)
            .sum();
        let expense: Decimal = ledger
            .iter()
            .filter(|tx| tx.tx_type == TransactionType::Expense)
            .map(|tx| tx.amount)
            .sum();

        let summed_income: Decimal = totals.user_totals.values().map(|t| t.income).sum();
        let summed_expense: Decimal = totals.user_totals.values().map(|t| t.expense).sum();

        prop_assert!((summed_income - income).abs() < tolerance());
        prop_assert!((summed_expense - expense).abs() < tolerance());
    }
}

proptest! {
    #[test]
    fn each_allocation_conserves_its_transaction_amount(
        specs in prop::collection::vec(tx_spec(), 0..=25),
    ) {
        let ledger = build_ledger(&specs);

        for tx in &ledger {
            for filter in [ShareFilter::Accepted, ShareFilter::All] {
                let allocation = allocate(tx, filter).expect("amounts stay in range");
                let portions: Decimal = allocation.portions.iter().map(|p| p.amount).sum();

                prop_assert!(
                    (allocation.owner_amount + portions - tx.amount).abs() < tolerance(),
                    "transaction {} under {:?}: owner {} portions {}",
                    tx.id,
                    filter,
                    allocation.owner_amount,
                    portions
                );
            }
        }
    }
}

proptest! {
    #[test]
    fn settlements_are_positive_and_pairwise_unique(
        specs in prop::collection::vec(tx_spec(), 0..=25),
        include_unaccepted in any::<bool>(),
    ) {
        let ledger = build_ledger(&specs);
        let totals = engine(include_unaccepted).compute_monthly_split_totals(&ledger, march());

        let mut pairs = BTreeSet::new();
        for settlement in &totals.settlements {
            prop_assert_ne!(&settlement.from, &settlement.to);
            prop_assert!(settlement.amount > Decimal::ZERO);

            let pair = if settlement.from < settlement.to {
                (settlement.from.clone(), settlement.to.clone())
            } else {
                (settlement.to.clone(), settlement.from.clone())
            };
            prop_assert!(pairs.insert(pair), "pair settled twice: {:?}", settlement);
        }
    }
}

proptest! {
    #[test]
    fn computation_is_idempotent(specs in prop::collection::vec(tx_spec(), 0..=25)) {
        let ledger = build_ledger(&specs);
        let engine = SettlementEngine::new();

        let first = engine.compute_monthly_split_totals(&ledger, march());
        let second = engine.compute_monthly_split_totals(&ledger, march());
        prop_assert_eq!(first, second);

        for user in USERS {
            let first = engine.compute_monthly_shared_summary_for_user(&ledger, user, march());
            let second = engine.compute_monthly_shared_summary_for_user(&ledger, user, march());
            prop_assert_eq!(first, second);
        }
    }
}

proptest! {
    #[test]
    fn summary_balances_agree_with_settlements(
        specs in prop::collection::vec(tx_spec(), 0..=25),
        include_unaccepted in any::<bool>(),
    ) {
        let ledger = build_ledger(&specs);
        let engine = engine(include_unaccepted);
        let totals = engine.compute_monthly_split_totals(&ledger, march());

        for user in USERS {
            let summaries = engine.compute_monthly_shared_summary_for_user(&ledger, user, march());

            for summary in &summaries {
                prop_assert_ne!(summary.user_id.as_str(), user);
                let owed_to_user = settled(&totals, &summary.user_id, user);
                prop_assert!(
                    (summary.balance - owed_to_user).abs() < tolerance(),
                    "{} vs {}: summary {} settlements {}",
                    user,
                    summary.user_id,
                    summary.balance,
                    owed_to_user
                );
            }

            // Every settlement touching the user has a summary entry
            for settlement in &totals.settlements {
                let counterpart = if settlement.from == user {
                    &settlement.to
                } else if settlement.to == user {
                    &settlement.from
                } else {
                    continue;
                };
                prop_assert!(summaries.iter().any(|s| &s.user_id == counterpart));
            }
        }
    }
}
