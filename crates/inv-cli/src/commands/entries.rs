//! Entries command: prints the billing entries per client.
//!
//! Useful for checking what `inv generate` would bill without writing any
//! documents.

use std::fmt::Write;

use anyhow::{Context, Result};
use inv_core::{BillingEntry, ClientBilling, Period, bill_clients};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::Config;
use crate::clients::load_clients;
use crate::invoice::two_places;

/// One client's entries for JSON output.
#[derive(Debug, Serialize)]
struct JsonClient<'a> {
    id: &'a str,
    name: &'a str,
    total_hours: Decimal,
    entries: &'a [BillingEntry],
}

/// JSON output structure.
#[derive(Debug, Serialize)]
struct JsonEntries<'a> {
    period: Period,
    clients: Vec<JsonClient<'a>>,
}

/// Format billing entries for human-readable output.
pub fn format_entries(billings: &[ClientBilling<'_>], period: Period, marker_keyword: &str) -> String {
    let mut output = String::new();

    writeln!(output, "BILLING ENTRIES: {}", period.label()).unwrap();

    if billings.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No clients configured.").unwrap();
        return output;
    }

    for billing in billings {
        writeln!(output).unwrap();
        writeln!(output, "{} ({})", billing.client.name, billing.client.id).unwrap();
        if billing.is_empty() {
            writeln!(output, "  No billable entries.").unwrap();
            continue;
        }
        for entry in &billing.entries {
            let hours = format!("{} h", two_places(entry.hours()));
            if entry.has_supplemental_fee() {
                writeln!(output, "  {}  {hours:>8}  {marker_keyword}", entry.date()).unwrap();
            } else {
                writeln!(output, "  {}  {hours:>8}", entry.date()).unwrap();
            }
        }
        writeln!(output, "  Total: {} h", two_places(billing.total_hours())).unwrap();
    }

    output
}

/// Format billing entries as JSON.
pub fn format_entries_json(billings: &[ClientBilling<'_>], period: Period) -> Result<String> {
    let clients = billings
        .iter()
        .map(|billing| JsonClient {
            id: billing.client.id.as_str(),
            name: &billing.client.name,
            total_hours: billing.total_hours(),
            entries: &billing.entries,
        })
        .collect();

    Ok(serde_json::to_string_pretty(&JsonEntries { period, clients })?)
}

pub fn run(config: &Config, period: Period, json: bool) -> Result<()> {
    let clients = load_clients(&config.clients_path)?;
    let events = inv_ics::load_calendar(&config.calendar_path).context("failed to load calendar events")?;
    let marker = config.fee_marker();

    let billings = bill_clients(&events, &clients, period, &marker);

    if json {
        println!("{}", format_entries_json(&billings, period)?);
    } else {
        print!("{}", format_entries(&billings, period, marker.keyword()));
    }
    Ok(())
}
