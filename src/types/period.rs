//! Calendar periods a report can cover
//!
//! Transactions carry plain calendar dates, so a period is an inclusive
//! range of dates: the first instant of a month is its first day and the
//! last instant is its last day.

use super::error::LedgerError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Whether `date` falls within `[start, end]`
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A validated calendar month
///
/// Construction resolves the first and last day, so the boundaries are
/// always available without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    year: i32,
    month: u32,
    range: DateRange,
}

impl Month {
    /// Create a month from a year and a month number (1-12)
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidPeriod` when the month number is out of
    /// range or the year cannot be represented.
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        let invalid = || LedgerError::invalid_period(&format!("{:04}-{:02}", year, month));

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_start = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next_start
            .and_then(|d| d.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Month {
            year,
            month,
            range: DateRange::new(start, end),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn start(&self) -> NaiveDate {
        self.range.start
    }

    /// Last day of the month
    pub fn end(&self) -> NaiveDate {
        self.range.end
    }

    pub fn range(&self) -> DateRange {
        self.range
    }
}

impl FromStr for Month {
    type Err = LedgerError;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| LedgerError::invalid_period(s))?;

        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(LedgerError::invalid_period(s));
        }

        let year: i32 = year.parse().map_err(|_| LedgerError::invalid_period(s))?;
        let month: u32 = month.parse().map_err(|_| LedgerError::invalid_period(s))?;

        Month::new(year, month).map_err(|_| LedgerError::invalid_period(s))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A validated calendar year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Year {
    year: i32,
    range: DateRange,
}

impl Year {
    pub fn new(year: i32) -> Result<Self, LedgerError> {
        let invalid = || LedgerError::invalid_period(&year.to_string());
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;

        Ok(Year {
            year,
            range: DateRange::new(start, end),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn range(&self) -> DateRange {
        self.range
    }
}

impl FromStr for Year {
    type Err = LedgerError;

    /// Parse `YYYY`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 4 {
            return Err(LedgerError::invalid_period(s));
        }
        let year: i32 = trimmed
            .parse()
            .map_err(|_| LedgerError::invalid_period(s))?;
        Year::new(year)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)
    }
}

/// The span a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month(Month),
    Year(Year),
}

impl Period {
    pub fn range(&self) -> DateRange {
        match self {
            Period::Month(month) => month.range(),
            Period::Year(year) => year.range(),
        }
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    /// Parse `YYYY-MM` as a month or `YYYY` as a year
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('-') {
            s.parse().map(Period::Month)
        } else {
            s.parse().map(Period::Year)
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month(month) => month.fmt(f),
            Period::Year(year) => year.fmt(f),
        }
    }
}
