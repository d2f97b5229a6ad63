//! Assigning calendar events to clients by summary prefix.

use crate::client::Client;
use crate::event::Event;
use crate::types::ClientId;

/// Whether `summary` belongs to the client with `id`.
///
/// The summary must start with the id, and the id must be followed by either
/// the end of the summary or a space. "AA" therefore matches "AA" and
/// "AA session" but not "AAB session".
pub fn summary_matches(summary: &str, id: &ClientId) -> bool {
    summary
        .strip_prefix(id.as_str())
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
}

/// The events assigned to one client, split by recurrence.
#[derive(Debug, Clone)]
pub struct ClientEvents<'a> {
    pub client: &'a Client,
    pub recurring: Vec<&'a Event>,
    pub one_off: Vec<&'a Event>,
}

impl<'a> ClientEvents<'a> {
    const fn new(client: &'a Client) -> Self {
        Self {
            client,
            recurring: Vec::new(),
            one_off: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recurring.is_empty() && self.one_off.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recurring.len() + self.one_off.len()
    }
}

/// Partitions `events` among `clients`.
///
/// Each event goes to the first client (in `clients` order) whose id matches
/// its summary. Unmatched events are not billable and are dropped. The result
/// has one entry per client, in `clients` order, and keeps calendar order
/// within each subset.
pub fn partition_by_client<'a>(events: &'a [Event], clients: &'a [Client]) -> Vec<ClientEvents<'a>> {
    let mut partitions: Vec<ClientEvents<'a>> = clients.iter().map(ClientEvents::new).collect();

    for event in events {
        let Some(slot) = partitions
            .iter_mut()
            .find(|p| summary_matches(&event.summary, &p.client.id))
        else {
            tracing::trace!(summary = %event.summary, "event matches no client");
            continue;
        };

        if event.is_recurring() {
            slot.recurring.push(event);
        } else {
            slot.one_off.push(event);
        }
    }

    partitions
}
