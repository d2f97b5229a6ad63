//! Building the final per-client billing entry list.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::client::Client;
use crate::collector::{OneOffEntries, collect_one_off};
use crate::entry::{BillingEntry, FeeMarker};
use crate::event::Event;
use crate::expander::expand;
use crate::matcher::{ClientEvents, partition_by_client};
use crate::period::Period;

/// A client's billing entries for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientBilling<'a> {
    pub client: &'a Client,
    pub period: Period,
    /// Sorted by date, at most one entry per date.
    pub entries: Vec<BillingEntry>,
}

impl ClientBilling<'_> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_hours(&self) -> Decimal {
        self.entries.iter().map(BillingEntry::hours).sum()
    }
}

/// Merges the expansions of several recurring events into one list.
///
/// When two events produce the same date, the earlier expansion (calendar
/// order) keeps the date and its hours; the fee flag is kept if either had it.
pub fn merge_recurring(expansions: impl IntoIterator<Item = Vec<BillingEntry>>) -> Vec<BillingEntry> {
    let mut by_date: BTreeMap<NaiveDate, BillingEntry> = BTreeMap::new();
    for entry in expansions.into_iter().flatten() {
        by_date
            .entry(entry.date())
            .and_modify(|kept| {
                if entry.has_supplemental_fee() {
                    *kept = kept.with_supplemental_fee();
                }
            })
            .or_insert(entry);
    }
    by_date.into_values().collect()
}

/// Combines recurring and one-off entries into the final sorted list.
///
/// Recurring dates listed in `one_off.flagged_recurring` gain the
/// supplemental fee. Recurring entries win any date collision.
pub fn build_entries(recurring: Vec<BillingEntry>, one_off: OneOffEntries) -> Vec<BillingEntry> {
    let OneOffEntries {
        entries: one_off_entries,
        flagged_recurring,
    } = one_off;

    let mut entries: Vec<BillingEntry> = recurring
        .into_iter()
        .map(|entry| {
            if flagged_recurring.contains(&entry.date()) {
                entry.with_supplemental_fee()
            } else {
                entry
            }
        })
        .chain(one_off_entries)
        .collect();

    // Stable sort keeps recurring entries ahead of one-offs on the same date.
    entries.sort_by_key(BillingEntry::date);
    entries.dedup_by(|later, kept| {
        if later.date() != kept.date() {
            return false;
        }
        if later.has_supplemental_fee() {
            *kept = kept.with_supplemental_fee();
        }
        true
    });
    entries
}

/// Runs the whole pipeline for one client's events.
///
/// Recurring events that cannot be expanded are logged and skipped.
pub fn bill_client<'a>(
    events: &ClientEvents<'a>,
    period: Period,
    marker: &FeeMarker,
) -> ClientBilling<'a> {
    let client = events.client;
    let _span = tracing::info_span!("bill_client", client = %client.id).entered();

    let expansions = events
        .recurring
        .iter()
        .filter_map(|event| match expand(event, period, marker) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(summary = %event.summary, error = %e, "skipping recurring event");
                None
            }
        });
    let recurring = merge_recurring(expansions);

    let recurring_dates: BTreeSet<NaiveDate> = recurring.iter().map(BillingEntry::date).collect();
    let one_off = collect_one_off(&events.one_off, period, &recurring_dates, marker);

    let entries = build_entries(recurring, one_off);
    tracing::debug!(entries = entries.len(), "built billing entries");

    ClientBilling {
        client,
        period,
        entries,
    }
}

/// Bills every client for `period`.
///
/// Clients are independent: each reads the shared events and writes its own
/// list, so they are processed in parallel. Results keep `clients` order.
pub fn bill_clients<'a>(
    events: &'a [Event],
    clients: &'a [Client],
    period: Period,
    marker: &FeeMarker,
) -> Vec<ClientBilling<'a>> {
    partition_by_client(events, clients)
        .par_iter()
        .map(|client_events| bill_client(client_events, period, marker))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDateTime};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::event::{Frequency, Recurrence};
    use crate::types::{ClientId, EventId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32) -> NaiveDateTime {
        d.and_hms_opt(h, 0, 0).unwrap()
    }

    fn timed(uid: &str, summary: &str, day: NaiveDate, minutes: i64) -> Event {
        let start = at(day, 9);
        Event::new(EventId::new(uid).unwrap(), summary, start)
            .with_end(start + Duration::minutes(minutes))
    }

    fn weekly(uid: &str, summary: &str, day: NaiveDate, minutes: i64) -> Event {
        timed(uid, summary, day, minutes).with_recurrence(Recurrence::new(Frequency::Weekly))
    }

    fn april() -> Period {
        Period::new(2024, 4).unwrap()
    }

    fn client(id: &str) -> Client {
        Client::new(ClientId::new(id).unwrap(), format!("{id} Name"), dec!(60))
    }

    #[test]
    fn merge_keeps_first_expansion_and_ors_flags() {
        let d = date(2024, 4, 1);
        let merged = merge_recurring([
            vec![BillingEntry::new(d, dec!(2), false)],
            vec![BillingEntry::new(d, dec!(3), true)],
        ]);
        assert_eq!(merged, vec![BillingEntry::new(d, dec!(2), true)]);
    }

    #[test]
    fn build_sorts_and_applies_recurring_flags() {
        let recurring = vec![
            BillingEntry::new(date(2024, 4, 1), dec!(2), false),
            BillingEntry::new(date(2024, 4, 8), dec!(2), false),
        ];
        let one_off = OneOffEntries {
            entries: vec![BillingEntry::new(date(2024, 4, 3), dec!(1.5), false)],
            flagged_recurring: BTreeSet::from([date(2024, 4, 8)]),
        };

        let entries = build_entries(recurring, one_off);

        assert_eq!(
            entries,
            vec![
                BillingEntry::new(date(2024, 4, 1), dec!(2), false),
                BillingEntry::new(date(2024, 4, 3), dec!(1.5), false),
                BillingEntry::new(date(2024, 4, 8), dec!(2), true),
            ]
        );
    }

    #[test]
    fn build_never_emits_duplicate_dates() {
        let d = date(2024, 4, 1);
        let one_off = OneOffEntries {
            entries: vec![BillingEntry::new(d, dec!(5), true)],
            flagged_recurring: BTreeSet::new(),
        };

        let entries = build_entries(vec![BillingEntry::new(d, dec!(2), false)], one_off);

        assert_eq!(entries, vec![BillingEntry::new(d, dec!(2), true)]);
    }

    #[test]
    fn weekly_plus_one_off_in_order() {
        let events = vec![
            weekly("w", "Client A", date(2024, 1, 1), 120),
            timed("s", "Client A - session", date(2024, 4, 3), 90),
        ];
        let clients = vec![client("Client A")];

        let billed = bill_clients(&events, &clients, april(), &FeeMarker::default());

        let dates: Vec<_> = billed[0].entries.iter().map(BillingEntry::date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 4, 1),
                date(2024, 4, 3),
                date(2024, 4, 8),
                date(2024, 4, 15),
                date(2024, 4, 22),
                date(2024, 4, 29),
            ]
        );
        assert_eq!(billed[0].entries[1].hours(), dec!(1.5));
        assert_eq!(billed[0].total_hours(), dec!(11.5));
    }

    #[test]
    fn colliding_one_off_only_adds_parking_flag() {
        let events = vec![
            weekly("w", "AA", date(2024, 1, 1), 120),
            timed("p", "AA parking", date(2024, 4, 15), 30),
        ];
        let clients = vec![client("AA")];

        let billed = bill_clients(&events, &clients, april(), &FeeMarker::default());

        let entries = &billed[0].entries;
        assert_eq!(entries.len(), 5);
        let flagged: Vec<_> = entries
            .iter()
            .filter(|e| e.has_supplemental_fee())
            .map(BillingEntry::date)
            .collect();
        assert_eq!(flagged, vec![date(2024, 4, 15)]);
        assert_eq!(entries[2].hours(), dec!(2));
    }

    #[test]
    fn exclusion_on_one_event_does_not_remove_another() {
        let events = vec![
            weekly("a", "AA", date(2024, 1, 1), 120).with_exclusions([date(2024, 4, 15)]),
            weekly("b", "AA group", date(2024, 4, 15), 60),
        ];
        let clients = vec![client("AA")];

        let billed = bill_clients(&events, &clients, april(), &FeeMarker::default());

        let on_15th = billed[0]
            .entries
            .iter()
            .find(|e| e.date() == date(2024, 4, 15))
            .expect("second event still bills the 15th");
        assert_eq!(on_15th.hours(), dec!(1));
    }

    #[test]
    fn unsupported_rule_is_skipped_but_others_still_bill() {
        let yearly = timed("y", "AA yearly", date(2023, 4, 2), 60)
            .with_recurrence(Recurrence::new(Frequency::Yearly));
        let events = vec![yearly, weekly("w", "AA", date(2024, 1, 1), 60)];
        let clients = vec![client("AA")];

        let billed = bill_clients(&events, &clients, april(), &FeeMarker::default());

        assert_eq!(billed[0].entries.len(), 5);
    }

    #[test]
    fn results_follow_client_order() {
        let events = vec![
            timed("1", "BB", date(2024, 4, 2), 60),
            timed("2", "AA", date(2024, 4, 3), 60),
        ];
        let clients = vec![client("BB"), client("CC"), client("AA")];

        let billed = bill_clients(&events, &clients, april(), &FeeMarker::default());

        let ids: Vec<_> = billed.iter().map(|b| b.client.id.as_str()).collect();
        assert_eq!(ids, vec!["BB", "CC", "AA"]);
        assert!(billed[1].is_empty());
    }
}
