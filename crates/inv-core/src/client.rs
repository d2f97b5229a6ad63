//! Billed clients.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ClientId;

/// A client as configured for invoicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Summary prefix that assigns events to this client.
    pub id: ClientId,
    /// Name printed on the invoice and used for file names.
    pub name: String,
    /// Hourly rate.
    pub rate: Decimal,
    /// Flat fee added to entries carrying the supplemental-fee flag.
    #[serde(default)]
    pub parking_rate: Option<Decimal>,
}

impl Client {
    pub fn new(id: ClientId, name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            rate,
            parking_rate: None,
        }
    }

    #[must_use]
    pub const fn with_parking_rate(mut self, parking_rate: Decimal) -> Self {
        self.parking_rate = Some(parking_rate);
        self
    }
}
