//! Invoicing period (a calendar month).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// A target calendar month.
///
/// Every date comparison in the billing pipeline is a naive local-date
/// comparison against this period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period after validating the month number.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::MonthOutOfRange { value: month });
        }
        // Rejects years chrono cannot represent.
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ValidationError::InvalidPeriod {
                value: format!("{year}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    /// The calendar month before the one containing `today`.
    ///
    /// This is the default invoicing period: a run early in May bills April.
    pub fn previous_to(today: NaiveDate) -> Self {
        if today.month() == 1 {
            Self {
                year: today.year() - 1,
                month: 12,
            }
        } else {
            Self {
                year: today.year(),
                month: today.month() - 1,
            }
        }
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (inclusive).
    pub fn last_day(self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether `date` falls inside this month.
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Number of whole months from `date`'s month to this period.
    ///
    /// Negative when `date` lies after the period.
    pub fn months_since(self, date: NaiveDate) -> i64 {
        (i64::from(self.year) * 12 + i64::from(self.month))
            - (i64::from(date.year()) * 12 + i64::from(date.month()))
    }

    /// Month name and year, e.g. "April 2024".
    pub fn label(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// Lowercase month name, e.g. "april". Used for output folders.
    pub fn month_slug(self) -> String {
        self.first_day().format("%B").to_string().to_lowercase()
    }

    /// Month and year joined for file names, e.g. "04_2024".
    pub fn file_stamp(self) -> String {
        format!("{:02}_{}", self.month, self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPeriod {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}
