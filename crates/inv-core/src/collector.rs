//! One-off (non-recurring) events.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::entry::{BillingEntry, FeeMarker};
use crate::event::Event;
use crate::period::Period;

/// Entries produced by one-off events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneOffEntries {
    /// New entries, at most one per date, sorted by date.
    pub entries: Vec<BillingEntry>,
    /// Recurring dates that a colliding one-off event flagged for the
    /// supplemental fee.
    pub flagged_recurring: BTreeSet<NaiveDate>,
}

/// Collects one-off events that fall in `period`.
///
/// `recurring_dates` are the dates already produced by recurrence expansion
/// for the same client. Those dates take precedence: a one-off event on one
/// of them adds no entry, but if it carries the fee marker its date lands in
/// [`OneOffEntries::flagged_recurring`]. A second one-off on the same date is
/// skipped the same way and can only add the fee flag to the first. Events
/// without billable hours (no end and no duration) produce nothing.
pub fn collect_one_off(
    events: &[&Event],
    period: Period,
    recurring_dates: &BTreeSet<NaiveDate>,
    marker: &FeeMarker,
) -> OneOffEntries {
    let mut by_date: BTreeMap<NaiveDate, BillingEntry> = BTreeMap::new();
    let mut flagged_recurring = BTreeSet::new();

    for event in events {
        let date = event.start_date();
        if !period.contains(date) {
            continue;
        }
        let flagged = marker.is_marked(&event.summary);

        if recurring_dates.contains(&date) {
            tracing::debug!(event = %event.id, %date, "one-off event overlaps recurring entry");
            if flagged {
                flagged_recurring.insert(date);
            }
            continue;
        }

        if let Some(existing) = by_date.get_mut(&date) {
            tracing::debug!(event = %event.id, %date, "duplicate one-off event skipped");
            if flagged {
                *existing = existing.with_supplemental_fee();
            }
            continue;
        }

        let Some(hours) = event.billable_hours() else {
            tracing::debug!(event = %event.id, %date, "one-off event has no billable hours");
            continue;
        };

        tracing::debug!(event = %event.id, %date, %hours, "added one-off event");
        by_date.insert(date, BillingEntry::new(date, hours, flagged));
    }

    OneOffEntries {
        entries: by_date.into_values().collect(),
        flagged_recurring,
    }
}
