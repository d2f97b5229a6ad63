//! iCalendar loading for calendar invoicing.
//!
//! Reads `.ics` data with the `ical` crate and normalizes every `VEVENT` into
//! an [`inv_core::Event`]:
//!
//! - `DTSTART`/`DTEND` become naive local date-times (`TZID` is not applied)
//! - `DURATION`, `RRULE` and `EXDATE` are parsed into their core types
//! - revisions sharing a `UID` collapse to the highest `SEQUENCE`
//! - `STATUS:CANCELLED` events are dropped
//! - `RECURRENCE-ID` overrides become one-off events, and the occurrence
//!   they replace is excluded from the recurring master
//!
//! Malformed events are logged and skipped; only unreadable files and
//! unparseable calendar streams are errors.

pub mod error;
pub mod rule;
pub mod value;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;
use ical::parser::ical::component::IcalEvent;
use inv_core::{Event, EventId};

pub use error::{EventError, IcsError, Result};
pub use rule::{RuleError, parse_rrule};

/// Loads and normalizes all events from an `.ics` file.
pub fn load_calendar(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IcsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let events = parse_calendar(BufReader::new(file))?;
    tracing::info!(path = %path.display(), events = events.len(), "loaded calendar");
    Ok(events)
}

/// Parses and normalizes all events from iCalendar data.
pub fn parse_calendar<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut parsed = Vec::new();
    let mut index = 0;

    for calendar in ical::IcalParser::new(reader) {
        let calendar = calendar.map_err(|e| IcsError::Parse(e.to_string()))?;
        for vevent in &calendar.events {
            index += 1;
            match parse_event(vevent, index) {
                Ok(event) => parsed.push(event),
                Err(e) => {
                    let summary = property(vevent, "SUMMARY").unwrap_or_default();
                    tracing::warn!(%summary, error = %e, "skipping calendar event");
                }
            }
        }
    }

    Ok(normalize(parsed))
}

/// A VEVENT before revision and override handling.
#[derive(Debug, Clone)]
struct ParsedEvent {
    event: Event,
    /// Date of the occurrence this event overrides (`RECURRENCE-ID`).
    overrides: Option<NaiveDate>,
    cancelled: bool,
}

fn parse_event(vevent: &IcalEvent, index: usize) -> std::result::Result<ParsedEvent, EventError> {
    let uid = property(vevent, "UID")
        .filter(|uid| !uid.trim().is_empty())
        .unwrap_or_else(|| format!("event-{index}"));
    let id = EventId::new(uid).map_err(|_| EventError::MissingProperty("UID"))?;
    let summary = property(vevent, "SUMMARY")
        .map(|s| value::unescape_text(&s))
        .unwrap_or_default();

    let start = property(vevent, "DTSTART").ok_or(EventError::MissingProperty("DTSTART"))?;
    let start = value::parse_date_time(&start).ok_or_else(|| EventError::InvalidValue {
        property: "DTSTART",
        value: start,
    })?;
    let mut event = Event::new(id, summary.trim(), start);

    if let Some(end) = property(vevent, "DTEND") {
        let end = value::parse_date_time(&end).ok_or_else(|| EventError::InvalidValue {
            property: "DTEND",
            value: end,
        })?;
        event = event.with_end(end);
    }
    if let Some(duration) = property(vevent, "DURATION") {
        let duration = value::parse_duration(&duration).ok_or_else(|| EventError::InvalidValue {
            property: "DURATION",
            value: duration,
        })?;
        event = event.with_duration(duration);
    }
    if let Some(rule) = property(vevent, "RRULE") {
        event = event.with_recurrence(parse_rrule(&rule)?);
    }
    for exdate in properties(vevent, "EXDATE") {
        let dates = value::parse_date_list(exdate).ok_or_else(|| EventError::InvalidValue {
            property: "EXDATE",
            value: exdate.to_string(),
        })?;
        event = event.with_exclusions(dates);
    }
    if let Some(sequence) = property(vevent, "SEQUENCE") {
        let sequence = sequence
            .trim()
            .parse::<u32>()
            .map_err(|_| EventError::InvalidValue {
                property: "SEQUENCE",
                value: sequence.clone(),
            })?;
        event = event.with_sequence(sequence);
    }

    let overrides = property(vevent, "RECURRENCE-ID")
        .map(|raw| {
            value::parse_date(&raw).ok_or(EventError::InvalidValue {
                property: "RECURRENCE-ID",
                value: raw,
            })
        })
        .transpose()?;
    let cancelled = property(vevent, "STATUS")
        .is_some_and(|status| status.trim().eq_ignore_ascii_case("CANCELLED"));

    Ok(ParsedEvent {
        event,
        overrides,
        cancelled,
    })
}

/// Collapses revisions, applies overrides and drops cancelled events.
///
/// Calendar order is preserved (by first appearance of each revision key).
fn normalize(parsed: Vec<ParsedEvent>) -> Vec<Event> {
    // Keep the highest SEQUENCE per (UID, RECURRENCE-ID); ties keep the first.
    let mut slots: HashMap<(EventId, Option<NaiveDate>), usize> = HashMap::new();
    let mut latest: Vec<ParsedEvent> = Vec::new();
    for candidate in parsed {
        let key = (candidate.event.id.clone(), candidate.overrides);
        match slots.get(&key) {
            Some(&slot) => {
                if candidate.event.sequence > latest[slot].event.sequence {
                    tracing::debug!(uid = %key.0, sequence = candidate.event.sequence, "newer revision replaces older");
                    latest[slot] = candidate;
                }
            }
            None => {
                slots.insert(key, latest.len());
                latest.push(candidate);
            }
        }
    }

    let mut overridden: HashMap<EventId, HashSet<NaiveDate>> = HashMap::new();
    for item in &latest {
        if let Some(date) = item.overrides {
            overridden.entry(item.event.id.clone()).or_default().insert(date);
        }
    }

    latest
        .into_iter()
        .filter_map(|item| {
            if item.cancelled {
                tracing::debug!(uid = %item.event.id, summary = %item.event.summary, "dropping cancelled event");
                return None;
            }
            let mut event = item.event;
            if item.overrides.is_none() && event.is_recurring() {
                if let Some(dates) = overridden.get(&event.id) {
                    event = event.with_exclusions(dates.iter().copied());
                }
            }
            Some(event)
        })
        .collect()
}

/// First value of the named property.
fn property(vevent: &IcalEvent, name: &str) -> Option<String> {
    properties(vevent, name).next().map(str::to_string)
}

/// All values of the named property, in file order.
fn properties<'a>(vevent: &'a IcalEvent, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    vevent
        .properties
        .iter()
        .filter(move |p| p.name.eq_ignore_ascii_case(name))
        .filter_map(|p| p.value.as_deref())
}
