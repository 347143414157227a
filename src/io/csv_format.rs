//! CSV format handling for ledger input and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for transactions and shares
//! - Conversion from rows to domain types, including boundary validation
//! - Report serialization (user totals, settlements, shared summaries)
//!
//! All functions are pure (no I/O beyond the supplied writer) for easy testing.
//!
//! # Input formats
//!
//! ```text
//! id,description,amount,type,user_id,date,category_id
//! id,transaction_id,shared_with_user_id,share_type,share_value,status,shared_with_name,shared_with_email
//! ```

use crate::types::{
    LedgerError, Settlement, Share, ShareStatus, ShareType, SharedSummary, Transaction,
    TransactionType, UserId, UserTotals,
};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;
use tracing::warn;

/// Scale used by the input for `percentage` share values
///
/// The engine works on 0-100. Inputs on a 0-1 scale are converted on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PercentageScale {
    /// Values are already percentages (0-100)
    #[default]
    Percent,

    /// Values are fractions (0-1)
    Fraction,
}

impl PercentageScale {
    /// Convert an input value to the canonical 0-100 scale
    pub fn normalize(&self, value: Decimal) -> Decimal {
        match self {
            PercentageScale::Percent => value,
            PercentageScale::Fraction => value * Decimal::ONE_HUNDRED,
        }
    }
}

/// Options applied while converting input rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOptions {
    pub percentage_scale: PercentageScale,
}

/// A CSV row kind that converts into a domain record
///
/// Implemented by both input row formats so the readers can stay generic.
pub trait CsvRow: DeserializeOwned + Send + 'static {
    /// Domain record produced by a valid row
    type Record: Send + 'static;

    /// Convert the deserialized row, validating its fields
    fn convert(self, options: &InputOptions) -> Result<Self::Record, LedgerError>;
}

/// Transaction row as read from CSV
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Share row as read from CSV
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ShareRow {
    pub id: String,
    pub transaction_id: String,
    pub shared_with_user_id: String,
    pub share_type: String,
    #[serde(default)]
    pub share_value: Option<String>,
    pub status: String,
    #[serde(default)]
    pub shared_with_name: Option<String>,
    #[serde(default)]
    pub shared_with_email: Option<String>,
}

impl CsvRow for TransactionRow {
    type Record = Transaction;

    fn convert(self, _options: &InputOptions) -> Result<Transaction, LedgerError> {
        convert_transaction_row(self)
    }
}

impl CsvRow for ShareRow {
    type Record = Share;

    fn convert(self, options: &InputOptions) -> Result<Share, LedgerError> {
        convert_share_row(self, options)
    }
}

/// Convert a TransactionRow to a Transaction
///
/// This function:
/// - Parses the type into a TransactionType (case-insensitive)
/// - Parses the amount and requires it to be strictly positive
/// - Parses the date as `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date
///
/// The returned transaction has no shares; they are attached during assembly.
pub fn convert_transaction_row(row: TransactionRow) -> Result<Transaction, LedgerError> {
    let tx_type = TransactionType::parse(row.tx_type.trim())
        .ok_or_else(|| LedgerError::invalid_transaction_type(&row.tx_type, &row.id))?;

    let amount = match non_empty(row.amount.as_deref()) {
        Some(amount_str) => Decimal::from_str(amount_str)
            .ok()
            .filter(|amount| *amount > Decimal::ZERO)
            .ok_or_else(|| {
                LedgerError::invalid_amount(amount_str, &format!("transaction {}", row.id))
            })?,
        None => return Err(LedgerError::missing_amount(&row.id)),
    };

    let date =
        parse_date(row.date.trim()).ok_or_else(|| LedgerError::invalid_date(&row.date, &row.id))?;

    Ok(Transaction {
        description: row.description.unwrap_or_default(),
        category_id: non_empty(row.category_id.as_deref()).map(str::to_string),
        shares: Vec::new(),
        id: row.id,
        amount,
        tx_type,
        user_id: row.user_id,
        date,
    })
}

/// Convert a ShareRow to a Share
///
/// This function:
/// - Parses the share rule and status (case-insensitive)
/// - Parses the optional value, rejecting negative values
/// - Converts percentage values to the 0-100 scale
///
/// Percentages above 100 are kept as-is with a warning; validating the
/// economics of a split is not the reader's job.
pub fn convert_share_row(row: ShareRow, options: &InputOptions) -> Result<Share, LedgerError> {
    let share_type = ShareType::parse(row.share_type.trim())
        .ok_or_else(|| LedgerError::invalid_share_type(&row.share_type, &row.id))?;

    let status = ShareStatus::parse(row.status.trim())
        .ok_or_else(|| LedgerError::invalid_share_status(&row.status, &row.id))?;

    let share_value = match non_empty(row.share_value.as_deref()) {
        Some(value_str) => {
            let value = Decimal::from_str(value_str)
                .ok()
                .filter(|value| *value >= Decimal::ZERO)
                .ok_or_else(|| {
                    LedgerError::invalid_amount(value_str, &format!("share {}", row.id))
                })?;
            Some(value)
        }
        None => None,
    };

    let share_value = match (share_type, share_value) {
        (ShareType::Percentage, Some(value)) => {
            let percentage = options.percentage_scale.normalize(value);
            if percentage > Decimal::ONE_HUNDRED {
                warn!(share = %row.id, %percentage, "percentage share exceeds 100%");
            }
            Some(percentage)
        }
        (_, value) => value,
    };

    Ok(Share {
        id: row.id,
        transaction_id: row.transaction_id,
        shared_with_user_id: row.shared_with_user_id,
        share_type,
        share_value,
        status,
        shared_with_name: non_empty(row.shared_with_name.as_deref()).map(str::to_string),
        shared_with_email: non_empty(row.shared_with_email.as_deref()).map(str::to_string),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Format an amount with 4 decimal places
fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(4);
    if rounded.is_zero() {
        format!("{:.4}", Decimal::ZERO)
    } else {
        format!("{:.4}", rounded)
    }
}

fn write_failed(error: csv::Error) -> LedgerError {
    LedgerError::IoError {
        message: format!("Failed to write CSV record: {}", error),
    }
}

/// Write per-user totals to CSV format
///
/// Writes columns: user, income, expense, net. Rows follow the map order
/// (sorted by user ID).
pub fn write_user_totals_csv(
    totals: &BTreeMap<UserId, UserTotals>,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["user", "income", "expense", "net"])
        .map_err(write_failed)?;

    for (user, user_totals) in totals {
        writer
            .write_record(&[
                user.clone(),
                format_amount(user_totals.income),
                format_amount(user_totals.expense),
                format_amount(user_totals.net()),
            ])
            .map_err(write_failed)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write settlements to CSV format
///
/// Writes columns: from, to, amount, in the order given.
pub fn write_settlements_csv(
    settlements: &[Settlement],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["from", "to", "amount"])
        .map_err(write_failed)?;

    for settlement in settlements {
        writer
            .write_record(&[
                settlement.from.clone(),
                settlement.to.clone(),
                format_amount(settlement.amount),
            ])
            .map_err(write_failed)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write shared summaries to CSV format
///
/// Writes columns: user, name, email, income, expense, balance. Unknown
/// names and emails are left empty.
pub fn write_shared_summaries_csv(
    summaries: &[SharedSummary],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["user", "name", "email", "income", "expense", "balance"])
        .map_err(write_failed)?;

    for summary in summaries {
        writer
            .write_record(&[
                summary.user_id.clone(),
                summary.name.clone().unwrap_or_default(),
                summary.email.clone().unwrap_or_default(),
                format_amount(summary.income),
                format_amount(summary.expense),
                format_amount(summary.balance),
            ])
            .map_err(write_failed)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn transaction_row(tx_type: &str, amount: Option<&str>, date: &str) -> TransactionRow {
        TransactionRow {
            id: "t1".to_string(),
            description: Some("Groceries".to_string()),
            amount: amount.map(|s| s.to_string()),
            tx_type: tx_type.to_string(),
            user_id: "u1".to_string(),
            date: date.to_string(),
            category_id: None,
        }
    }

    fn share_row(share_type: &str, value: Option<&str>, status: &str) -> ShareRow {
        ShareRow {
            id: "s1".to_string(),
            transaction_id: "t1".to_string(),
            shared_with_user_id: "u2".to_string(),
            share_type: share_type.to_string(),
            share_value: value.map(|s| s.to_string()),
            status: status.to_string(),
            shared_with_name: Some("Bea".to_string()),
            shared_with_email: Some("  ".to_string()),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case("expense", TransactionType::Expense, "2024-03-15")]
    #[case("INCOME", TransactionType::Income, "2024-03-15")]
    #[case("expense", TransactionType::Expense, "2024-03-15T23:30:00+00:00")]
    fn test_convert_transaction_row_valid(
        #[case] tx_type: &str,
        #[case] expected_type: TransactionType,
        #[case] date: &str,
    ) {
        let record = convert_transaction_row(transaction_row(tx_type, Some(" 12.50 "), date)).unwrap();

        assert_eq!(record.tx_type, expected_type);
        assert_eq!(record.amount, dec("12.50"));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(record.description, "Groceries");
        assert!(record.shares.is_empty());
    }

    #[rstest]
    #[case::invalid_type("transfer", Some("10"), "2024-03-01", "Invalid transaction type")]
    #[case::missing_amount("expense", None, "2024-03-01", "requires an amount")]
    #[case::empty_amount("expense", Some("  "), "2024-03-01", "requires an amount")]
    #[case::malformed_amount("expense", Some("ten"), "2024-03-01", "Invalid amount")]
    #[case::zero_amount("expense", Some("0"), "2024-03-01", "Invalid amount")]
    #[case::negative_amount("income", Some("-5"), "2024-03-01", "Invalid amount")]
    #[case::invalid_date("expense", Some("10"), "2024-02-30", "Invalid date")]
    #[case::garbage_date("expense", Some("10"), "yesterday", "Invalid date")]
    fn test_convert_transaction_row_errors(
        #[case] tx_type: &str,
        #[case] amount: Option<&str>,
        #[case] date: &str,
        #[case] expected_error: &str,
    ) {
        let result = convert_transaction_row(transaction_row(tx_type, amount, date));
        let error = result.unwrap_err().to_string();
        assert!(error.contains(expected_error), "unexpected error: {}", error);
    }

    #[rstest]
    #[case::equal("equal", None, PercentageScale::Percent, None)]
    #[case::percent("percentage", Some("25"), PercentageScale::Percent, Some("25"))]
    #[case::fraction("percentage", Some("0.25"), PercentageScale::Fraction, Some("25"))]
    #[case::fixed_ignores_scale("fixed_amount", Some("0.25"), PercentageScale::Fraction, Some("0.25"))]
    #[case::over_hundred_kept("percentage", Some("120"), PercentageScale::Percent, Some("120"))]
    fn test_convert_share_row_values(
        #[case] share_type: &str,
        #[case] value: Option<&str>,
        #[case] scale: PercentageScale,
        #[case] expected: Option<&str>,
    ) {
        let options = InputOptions {
            percentage_scale: scale,
        };
        let share = convert_share_row(share_row(share_type, value, "accepted"), &options).unwrap();

        assert_eq!(share.share_value, expected.map(dec));
        assert_eq!(share.status, ShareStatus::Accepted);
        assert_eq!(share.shared_with_name.as_deref(), Some("Bea"));
        assert_eq!(share.shared_with_email, None);
    }

    #[rstest]
    #[case::invalid_type("half", None, "accepted", "Invalid share type")]
    #[case::invalid_status("equal", None, "maybe", "Invalid share status")]
    #[case::negative_value("fixed_amount", Some("-1"), "accepted", "Invalid amount")]
    #[case::malformed_value("percentage", Some("abc"), "pending", "Invalid amount")]
    fn test_convert_share_row_errors(
        #[case] share_type: &str,
        #[case] value: Option<&str>,
        #[case] status: &str,
        #[case] expected_error: &str,
    ) {
        let result = convert_share_row(share_row(share_type, value, status), &InputOptions::default());
        let error = result.unwrap_err().to_string();
        assert!(error.contains(expected_error), "unexpected error: {}", error);
    }

    #[test]
    fn test_write_user_totals_csv() {
        let mut totals = BTreeMap::new();
        totals.insert(
            "u2".to_string(),
            UserTotals {
                income: dec("40"),
                expense: Decimal::ZERO,
            },
        );
        totals.insert(
            "u1".to_string(),
            UserTotals {
                income: dec("40"),
                expense: dec("33.333333333333333333"),
            },
        );

        let mut output = Vec::new();
        write_user_totals_csv(&totals, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "user,income,expense,net\nu1,40.0000,33.3333,6.6667\nu2,40.0000,0.0000,40.0000\n"
        );
    }

    #[rstest]
    #[case::empty(vec![], "from,to,amount\n")]
    #[case::keeps_order(
        vec![
            Settlement::new("u2", "u1", dec("50")),
            Settlement::new("u1", "u3", dec("12.34567")),
        ],
        "from,to,amount\nu2,u1,50.0000\nu1,u3,12.3457\n"
    )]
    fn test_write_settlements_csv(#[case] settlements: Vec<Settlement>, #[case] expected: &str) {
        let mut output = Vec::new();
        write_settlements_csv(&settlements, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }

    #[test]
    fn test_write_shared_summaries_csv() {
        let mut known = SharedSummary::new("u2");
        known.name = Some("Bea".to_string());
        known.email = Some("bea@example.com".to_string());
        known.expense = dec("50");
        known.balance = dec("50");

        let mut settled = SharedSummary::new("u3");
        settled.income = dec("10");
        settled.balance = dec("-10") + dec("10");

        let mut output = Vec::new();
        write_shared_summaries_csv(&[known, settled], &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "user,name,email,income,expense,balance\n\
             u2,Bea,bea@example.com,0.0000,50.0000,50.0000\n\
             u3,,,10.0000,0.0000,0.0000\n"
        );
    }
}
