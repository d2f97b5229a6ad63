//! Invoice lines and totals for one client and month.

use chrono::NaiveDate;
use inv_core::{BillingEntry, Client, ClientBilling, Period};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Who is billing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub mailing_address: String,
    pub phone_number: String,
}

/// Charges that apply to every line, independent of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTerms {
    pub service_name: String,
    pub travel_fee: Decimal,
}

/// One priced billing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    pub date: NaiveDate,
    pub hours: Decimal,
    pub rate: Decimal,
    pub travel_fee: Decimal,
    /// Present when the entry carries the supplemental fee and the client
    /// has a parking rate.
    pub parking: Option<Decimal>,
    pub total: Decimal,
}

impl InvoiceLine {
    fn price(entry: &BillingEntry, client: &Client, terms: &InvoiceTerms) -> Self {
        let parking = if entry.has_supplemental_fee() {
            if client.parking_rate.is_none() {
                tracing::warn!(
                    client = %client.id,
                    date = %entry.date(),
                    "entry has a parking marker but the client has no parking rate"
                );
            }
            client.parking_rate
        } else {
            None
        };
        let total = entry.hours() * client.rate + terms.travel_fee + parking.unwrap_or_default();

        Self {
            date: entry.date(),
            hours: entry.hours(),
            rate: client.rate,
            travel_fee: terms.travel_fee,
            parking,
            total,
        }
    }
}

/// A complete invoice, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice<'a> {
    pub provider: &'a Provider,
    pub client: &'a Client,
    pub period: Period,
    pub issued_on: NaiveDate,
    pub service_name: &'a str,
    pub lines: Vec<InvoiceLine>,
}

impl<'a> Invoice<'a> {
    pub fn new(
        billing: &ClientBilling<'a>,
        provider: &'a Provider,
        terms: &'a InvoiceTerms,
        issued_on: NaiveDate,
    ) -> Self {
        let lines = billing
            .entries
            .iter()
            .map(|entry| InvoiceLine::price(entry, billing.client, terms))
            .collect();

        Self {
            provider,
            client: billing.client,
            period: billing.period,
            issued_on,
            service_name: &terms.service_name,
            lines,
        }
    }

    /// Whether the parking column is shown.
    pub fn has_parking(&self) -> bool {
        self.lines.iter().any(|line| line.parking.is_some())
    }

    pub fn total_hours(&self) -> Decimal {
        self.lines.iter().map(|line| line.hours).sum()
    }

    pub fn total_amount(&self) -> Decimal {
        self.lines.iter().map(|line| line.total).sum()
    }
}

/// Formats a decimal with two places, rounding half away from zero.
pub fn two_places(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Formats a dollar amount, e.g. `$123.00`.
pub fn money(value: Decimal) -> String {
    format!("${}", two_places(value))
}
