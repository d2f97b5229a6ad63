//! Core billing logic for calendar-driven invoicing.
//!
//! This crate turns a set of calendar events into per-client billing entries
//! for one month:
//! - Matching: assigning events to clients by summary prefix
//! - Expansion: producing the occurrences of recurring events in a month
//! - Collection: picking up one-off events that do not overlap recurring ones
//! - Building: merging both into a sorted, date-unique entry list
//!
//! Loading calendars and rendering invoices live in other crates.

pub mod billing;
mod client;
pub mod collector;
mod entry;
mod event;
pub mod expander;
pub mod matcher;
mod period;
mod types;

pub use billing::{ClientBilling, bill_client, bill_clients, build_entries, merge_recurring};
pub use client::Client;
pub use collector::{OneOffEntries, collect_one_off};
pub use entry::{BillingEntry, FeeMarker};
pub use event::{Event, Frequency, Recurrence, hours_from};
pub use expander::{ExpandError, expand};
pub use matcher::{ClientEvents, partition_by_client, summary_matches};
pub use period::Period;
pub use types::{ClientId, EventId, ValidationError};
