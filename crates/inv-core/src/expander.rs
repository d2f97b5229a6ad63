//! Recurrence expansion: turns one recurring event into the billing entries
//! it produces inside a target month.
//!
//! # Algorithm
//!
//! 1. Find the first occurrence on or after the first day of the month that
//!    stays on the event's cadence (whole intervals of days, weeks or months
//!    counted from the original start).
//! 2. Step forward one interval at a time until the date leaves the month,
//!    the rule's `UNTIL` date is passed, or its `COUNT` is used up.
//! 3. Drop dates listed as exclusions.
//! 4. Attach the event's hours (computed once) and the supplemental-fee flag.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use thiserror::Error;

use crate::entry::{BillingEntry, FeeMarker};
use crate::event::{Event, Frequency, Recurrence};
use crate::period::Period;
use crate::types::EventId;

/// Reasons a single event contributes no entries.
///
/// None of these are fatal to a run: the caller logs them and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("event {event} has no recurrence rule")]
    NotRecurring { event: EventId },

    #[error("event {event} uses unsupported frequency {frequency}")]
    UnsupportedFrequency { event: EventId, frequency: Frequency },

    #[error("recurring event {event} has neither an end nor a duration")]
    MissingDuration { event: EventId },
}

/// Expands `event` into the entries it produces in `period`, sorted by date.
pub fn expand(
    event: &Event,
    period: Period,
    marker: &FeeMarker,
) -> Result<Vec<BillingEntry>, ExpandError> {
    let rule = event
        .recurrence
        .as_ref()
        .ok_or_else(|| ExpandError::NotRecurring {
            event: event.id.clone(),
        })?;

    let start = event.start_date();
    let dates = match rule.frequency() {
        Frequency::Daily => fixed_step(start, 1, rule, period),
        Frequency::Weekly if rule.by_day().is_empty() => fixed_step(start, 7, rule, period),
        Frequency::Weekly => weekly_by_day(start, rule, period),
        Frequency::Monthly => monthly(start, rule, period),
        frequency => {
            return Err(ExpandError::UnsupportedFrequency {
                event: event.id.clone(),
                frequency,
            });
        }
    };

    let hours = event
        .billable_hours()
        .ok_or_else(|| ExpandError::MissingDuration {
            event: event.id.clone(),
        })?;
    let flagged = marker.is_marked(&event.summary);

    let entries: Vec<BillingEntry> = dates
        .into_iter()
        .filter(|date| {
            let excluded = event.exclusions.contains(date);
            if excluded {
                tracing::debug!(event = %event.id, %date, "occurrence excluded");
            }
            !excluded
        })
        .map(|date| BillingEntry::new(date, hours, flagged))
        .collect();

    tracing::debug!(
        event = %event.id,
        summary = %event.summary,
        %period,
        occurrences = entries.len(),
        "expanded recurring event"
    );
    Ok(entries)
}

/// Whether an occurrence is still allowed by `UNTIL` and `COUNT`.
///
/// `ordinal` is the zero-based position of the occurrence counted from the
/// original start, before exclusions.
fn within_bounds(rule: &Recurrence, date: NaiveDate, ordinal: i64) -> bool {
    rule.until().is_none_or(|until| date <= until)
        && rule.count().is_none_or(|count| ordinal < i64::from(count))
}

/// Occurrences at `start + k * interval * unit_days` for `k = 0, 1, 2, ...`.
fn fixed_step(start: NaiveDate, unit_days: i64, rule: &Recurrence, period: Period) -> Vec<NaiveDate> {
    let first = period.first_day();
    let last = period.last_day();
    if start > last {
        return Vec::new();
    }

    let step = unit_days * i64::from(rule.interval());
    // Smallest k whose occurrence is not before the first day of the month.
    let mut k = if start >= first {
        0
    } else {
        ((first - start).num_days() + step - 1) / step
    };

    let mut dates = Vec::new();
    while let Some(date) = start.checked_add_signed(Duration::days(k * step)) {
        if date > last || !within_bounds(rule, date, k) {
            break;
        }
        dates.push(date);
        k += 1;
    }
    dates
}

/// Weekly rule with `BYDAY`: every listed weekday of each `interval`-th week.
///
/// Weeks start on Monday and are counted from the week containing `start`.
/// Days of that first week that fall before `start` are not occurrences.
fn weekly_by_day(start: NaiveDate, rule: &Recurrence, period: Period) -> Vec<NaiveDate> {
    let first = period.first_day();
    let last = period.last_day();
    if start > last {
        return Vec::new();
    }

    let days = rule.by_day();
    let anchor = monday_of(start);
    let step = 7 * i64::from(rule.interval());
    let per_week = i64::try_from(days.len()).unwrap_or(i64::MAX);
    // Days of the first week that precede `start`. They form a prefix because
    // `by_day` is sorted Monday first.
    let skipped = i64::try_from(
        days.iter()
            .filter(|day| offset_from_monday(anchor, **day) < start)
            .count(),
    )
    .unwrap_or(0);

    // First active week whose Sunday is not before the first day of the month.
    let reach = (first - anchor).num_days() - 6;
    let mut week = if reach <= 0 { 0 } else { (reach + step - 1) / step };

    let mut dates = Vec::new();
    'weeks: loop {
        let Some(monday) = anchor.checked_add_signed(Duration::days(week * step)) else {
            break;
        };
        if monday > last {
            break;
        }
        for (position, day) in (0_i64..).zip(days) {
            let date = offset_from_monday(monday, *day);
            if date < start {
                continue;
            }
            if date > last || !within_bounds(rule, date, week * per_week + position - skipped) {
                break 'weeks;
            }
            if date >= first {
                dates.push(date);
            }
        }
        week += 1;
    }
    dates
}

/// Monthly rule: the start's day-of-month, every `interval`-th month.
///
/// Months lacking that day (e.g. the 31st in April) have no occurrence and do
/// not count toward `COUNT`.
fn monthly(start: NaiveDate, rule: &Recurrence, period: Period) -> Vec<NaiveDate> {
    let months = period.months_since(start);
    let interval = i64::from(rule.interval());
    if months < 0 || months % interval != 0 {
        return Vec::new();
    }
    let Some(date) = NaiveDate::from_ymd_opt(period.year(), period.month(), start.day()) else {
        return Vec::new();
    };

    let ordinal = if rule.count().is_some() {
        valid_months_before(start, rule.interval(), months / interval)
    } else {
        0
    };

    if within_bounds(rule, date, ordinal) {
        vec![date]
    } else {
        Vec::new()
    }
}

/// Number of steps `0..steps` whose month contains the start's day-of-month.
fn valid_months_before(start: NaiveDate, interval: u32, steps: i64) -> i64 {
    let Some(month_start) = start.with_day(1) else {
        return 0;
    };
    let mut valid = 0;
    for step in 0..steps {
        let Some(offset) = u32::try_from(step)
            .ok()
            .and_then(|s| s.checked_mul(interval))
        else {
            break;
        };
        let landed = month_start
            .checked_add_months(Months::new(offset))
            .and_then(|m| m.with_day(start.day()));
        if landed.is_some() {
            valid += 1;
        }
    }
    valid
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn offset_from_monday(monday: NaiveDate, day: Weekday) -> NaiveDate {
    monday + Duration::days(i64::from(day.num_days_from_monday()))
}
