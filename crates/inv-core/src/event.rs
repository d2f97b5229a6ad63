//! Normalized calendar events.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::Decimal;

use crate::types::{EventId, ValidationError};

/// Recurrence frequency (RFC 5545 `FREQ`).
///
/// Only [`Daily`](Self::Daily), [`Weekly`](Self::Weekly) and
/// [`Monthly`](Self::Monthly) are expanded; the rest exist so that calendars
/// using them still load and the expander can report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Ok(Self::Secondly),
            "MINUTELY" => Ok(Self::Minutely),
            "HOURLY" => Ok(Self::Hourly),
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            _ => Err(ValidationError::UnknownFrequency {
                value: s.to_string(),
            }),
        }
    }
}

/// A recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    frequency: Frequency,
    interval: u32,
    until: Option<NaiveDate>,
    count: Option<u32>,
    by_day: Vec<Weekday>,
}

impl Recurrence {
    /// A rule repeating every single `frequency` unit, without end.
    pub const fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            until: None,
            count: None,
            by_day: Vec::new(),
        }
    }

    /// Sets the step between occurrences, in units of the frequency.
    pub fn with_interval(mut self, interval: u32) -> Result<Self, ValidationError> {
        if interval == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        self.interval = interval;
        Ok(self)
    }

    /// Sets the last date (inclusive) an occurrence may fall on.
    #[must_use]
    pub const fn with_until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    /// Caps the total number of occurrences counted from the first one.
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Restricts weekly rules to the given weekdays.
    #[must_use]
    pub fn with_by_day(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort_by_key(Weekday::num_days_from_monday);
        days.dedup();
        self.by_day = days;
        self
    }

    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub const fn interval(&self) -> u32 {
        self.interval
    }

    pub const fn until(&self) -> Option<NaiveDate> {
        self.until
    }

    pub const fn count(&self) -> Option<u32> {
        self.count
    }

    /// Weekdays from `BYDAY`, sorted Monday first.
    pub fn by_day(&self) -> &[Weekday] {
        &self.by_day
    }
}

/// A calendar event as loaded from the source calendar.
///
/// Events are immutable once loaded; all derived values are computed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub summary: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    /// Explicit `DURATION`, which wins over `end - start`.
    pub duration: Option<Duration>,
    pub recurrence: Option<Recurrence>,
    /// `EXDATE` values reduced to calendar dates.
    pub exclusions: BTreeSet<NaiveDate>,
    /// Revision number (`SEQUENCE`).
    pub sequence: u32,
}

impl Event {
    /// A one-off event without end or duration.
    pub fn new(id: EventId, summary: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            id,
            summary: summary.into(),
            start,
            end: None,
            duration: None,
            recurrence: None,
            exclusions: BTreeSet::new(),
            sequence: 0,
        }
    }

    #[must_use]
    pub const fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    #[must_use]
    pub fn with_exclusions(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.exclusions.extend(dates);
        self
    }

    #[must_use]
    pub const fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    pub const fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Length of one occurrence: explicit duration, else `end - start`.
    ///
    /// Returns `None` when neither is available or the length is not positive.
    pub fn billable_duration(&self) -> Option<Duration> {
        let duration = self
            .duration
            .or_else(|| self.end.map(|end| end - self.start))?;
        (duration > Duration::zero()).then_some(duration)
    }

    /// [`billable_duration`](Self::billable_duration) in hours.
    pub fn billable_hours(&self) -> Option<Decimal> {
        self.billable_duration().map(hours_from)
    }
}

/// Converts a duration to decimal hours at second precision.
pub fn hours_from(duration: Duration) -> Decimal {
    Decimal::from(duration.num_seconds()) / Decimal::from(3600)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn event(summary: &str) -> Event {
        Event::new(EventId::new("uid-1").unwrap(), summary, at(2024, 4, 1, 9, 0))
    }

    #[test]
    fn frequency_parses_case_insensitively() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("MONTHLY".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!("FORTNIGHTLY".parse::<Frequency>().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert_eq!(
            Recurrence::new(Frequency::Weekly).with_interval(0),
            Err(ValidationError::ZeroInterval)
        );
    }

    #[test]
    fn by_day_is_sorted_and_deduplicated() {
        let rule = Recurrence::new(Frequency::Weekly).with_by_day([
            Weekday::Fri,
            Weekday::Mon,
            Weekday::Fri,
        ]);
        assert_eq!(rule.by_day(), &[Weekday::Mon, Weekday::Fri]);
    }

    #[test]
    fn explicit_duration_wins_over_end() {
        let e = event("AA")
            .with_end(at(2024, 4, 1, 10, 0))
            .with_duration(Duration::minutes(90));
        assert_eq!(e.billable_hours(), Some(dec!(1.5)));
    }

    #[test]
    fn hours_fall_back_to_end_minus_start() {
        let e = event("AA").with_end(at(2024, 4, 1, 11, 0));
        assert_eq!(e.billable_hours(), Some(dec!(2)));
    }

    #[test]
    fn no_end_and_no_duration_has_no_hours() {
        assert_eq!(event("AA").billable_hours(), None);
    }

    #[test]
    fn non_positive_length_has_no_hours() {
        let e = event("AA").with_end(at(2024, 4, 1, 9, 0));
        assert_eq!(e.billable_duration(), None);
    }

    #[test]
    fn hours_keep_sub_hour_precision() {
        assert_eq!(hours_from(Duration::minutes(45)), dec!(0.75));
    }
}
