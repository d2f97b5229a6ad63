//! Billing entries and the supplemental-fee marker.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One billed date: its hours and whether the supplemental fee applies.
///
/// Entries are plain values. Changing the flag produces a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingEntry {
    date: NaiveDate,
    hours: Decimal,
    has_supplemental_fee: bool,
}

impl BillingEntry {
    pub const fn new(date: NaiveDate, hours: Decimal, has_supplemental_fee: bool) -> Self {
        Self {
            date,
            hours,
            has_supplemental_fee,
        }
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn hours(&self) -> Decimal {
        self.hours
    }

    pub const fn has_supplemental_fee(&self) -> bool {
        self.has_supplemental_fee
    }

    /// The same entry with the supplemental fee applied.
    #[must_use]
    pub const fn with_supplemental_fee(self) -> Self {
        Self {
            has_supplemental_fee: true,
            ..self
        }
    }
}

/// Detects the supplemental-fee keyword in event summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeMarker {
    keyword: String,
}

impl FeeMarker {
    /// The keyword used when none is configured.
    pub const DEFAULT_KEYWORD: &'static str = "park";

    pub fn new(keyword: impl AsRef<str>) -> Self {
        Self {
            keyword: keyword.as_ref().trim().to_lowercase(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Case-insensitive substring match. An empty keyword matches nothing.
    pub fn is_marked(&self, summary: &str) -> bool {
        !self.keyword.is_empty() && summary.to_lowercase().contains(&self.keyword)
    }
}

impl Default for FeeMarker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEYWORD)
    }
}
