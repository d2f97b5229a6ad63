//! `RRULE` value parsing.
//!
//! The `rrule` crate reads the value; the parts billing understands are then
//! copied into an [`inv_core::Recurrence`].

use chrono::Weekday;
use inv_core::{Frequency, Recurrence, ValidationError};
use rrule::{NWeekday, RRule, Unvalidated};
use thiserror::Error;

/// Why an `RRULE` value could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Parses an `RRULE` value such as `FREQ=WEEKLY;INTERVAL=2;UNTIL=20240630`.
///
/// `FREQ`, `INTERVAL`, `UNTIL`, `COUNT` and `BYDAY` are kept. `UNTIL` is cut
/// to its date; other parts are accepted and ignored.
pub fn parse_rrule(value: &str) -> Result<Recurrence, RuleError> {
    let parsed: RRule<Unvalidated> = value
        .trim()
        .parse()
        .map_err(|e: rrule::RRuleError| RuleError::Parse(e.to_string()))?;

    let frequency = frequency_of(parsed.get_freq());
    let mut rule = Recurrence::new(frequency).with_interval(u32::from(parsed.get_interval()))?;
    if let Some(until) = parsed.get_until() {
        rule = rule.with_until(until.date_naive());
    }
    if let Some(count) = parsed.get_count() {
        rule = rule.with_count(count);
    }

    let by_day: Vec<Weekday> = parsed.get_by_weekday().iter().map(weekday_of).collect();
    if !by_day.is_empty() {
        if frequency != Frequency::Weekly {
            tracing::debug!(%frequency, "BYDAY only applies to weekly rules; ignoring");
        }
        rule = rule.with_by_day(by_day);
    }
    Ok(rule)
}

const fn frequency_of(frequency: rrule::Frequency) -> Frequency {
    match frequency {
        rrule::Frequency::Yearly => Frequency::Yearly,
        rrule::Frequency::Monthly => Frequency::Monthly,
        rrule::Frequency::Weekly => Frequency::Weekly,
        rrule::Frequency::Daily => Frequency::Daily,
        rrule::Frequency::Hourly => Frequency::Hourly,
        rrule::Frequency::Minutely => Frequency::Minutely,
        rrule::Frequency::Secondly => Frequency::Secondly,
    }
}

/// Ordinals (`1MO`, `-1FR`) are dropped; only the weekday is kept.
const fn weekday_of(day: &NWeekday) -> Weekday {
    match *day {
        NWeekday::Every(weekday) | NWeekday::Nth(_, weekday) => weekday,
    }
}
