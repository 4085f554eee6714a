//! Active ticket registry.
//!
//! The only lot-wide shared structure. Backed by `DashMap` so concurrent
//! entry and exit panels contend on shards, never on one lock.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::ticket::{Ticket, TicketId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Ticket {0} is already registered")]
    Duplicate(TicketId),
}

#[derive(Debug, Default)]
pub struct TicketRegistry {
    tickets: DashMap<TicketId, Ticket>,
}

impl TicketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write-once insert. An existing entry is never overwritten.
    pub fn register(&self, ticket: Ticket) -> Result<(), RegistryError> {
        match self.tickets.entry(ticket.id) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate(ticket.id)),
            Entry::Vacant(slot) => {
                slot.insert(ticket);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &TicketId) -> Option<Ticket> {
        self.tickets.get(id).map(|entry| entry.value().clone())
    }

    /// Remove and return the ticket. Exactly one concurrent caller gets it.
    pub fn take(&self, id: &TicketId) -> Option<Ticket> {
        self.tickets.remove(id).map(|(_, ticket)| ticket)
    }

    pub fn contains(&self, id: &TicketId) -> bool {
        self.tickets.contains_key(id)
    }

    /// Active tickets currently bound to `spot_id`.
    pub fn tickets_for_spot(&self, spot_id: &str) -> Vec<Ticket> {
        self.tickets
            .iter()
            .filter(|entry| entry.value().spot_id == spot_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
