//! Client and provider file loading.

use std::path::Path;

use anyhow::{Context, Result};
use inv_core::{Client, ClientId};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::invoice::Provider;

/// One client entry as written in the clients file.
#[derive(Debug, Deserialize)]
struct ClientRecord {
    name: String,
    rate: Decimal,
    #[serde(default, alias = "parking rate", alias = "parkingRate")]
    parking_rate: Option<Decimal>,
}

/// Parses a clients file keyed by client id.
///
/// ```json
/// { "AA": { "name": "Alice", "rate": 60, "parking rate": 10 } }
/// ```
///
/// File order is kept: it decides which client wins when two ids match the
/// same summary.
pub fn parse_clients(json: &str) -> Result<Vec<Client>> {
    let records: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(json).context("clients file must be a JSON object keyed by client id")?;

    records
        .into_iter()
        .map(|(id, value)| {
            let record: ClientRecord =
                serde_json::from_value(value).with_context(|| format!("invalid client {id:?}"))?;
            let id = ClientId::new(id.trim())?;
            let mut client = Client::new(id, record.name.trim(), record.rate);
            if let Some(parking_rate) = record.parking_rate {
                client = client.with_parking_rate(parking_rate);
            }
            Ok(client)
        })
        .collect()
}

pub fn load_clients(path: &Path) -> Result<Vec<Client>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read clients file {}", path.display()))?;
    let clients =
        parse_clients(&json).with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(count = clients.len(), "loaded clients");
    Ok(clients)
}

pub fn load_provider(path: &Path) -> Result<Provider> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read provider file {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}
