//! Parking tickets - the record of a successful reservation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::spot::Spot;
use crate::vehicle::{SpotType, Vehicle};

/// Unique identifier for a ticket.
///
/// UUID v4 so ids from concurrent entry panels never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(uuid::Uuid);

impl TicketId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        let uuid = uuid::Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable reservation record binding a vehicle to a spot from `entry_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub vehicle: Vehicle,
    pub spot_id: String,
    pub spot_type: SpotType,
    pub floor_id: String,
    pub entry_time: DateTime<Utc>,
}

impl Ticket {
    /// Time parked as of `exit_time`, clamped at zero.
    pub fn duration_until(&self, exit_time: DateTime<Utc>) -> chrono::Duration {
        (exit_time - self.entry_time).max(chrono::Duration::zero())
    }
}

/// Issues tickets for freshly reserved spots.
pub trait TicketGenerator: Send + Sync {
    fn generate(&self, vehicle: &Vehicle, spot: &Spot, floor_id: &str) -> Ticket;
}

/// Random ids stamped with the wall clock at issue time.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTicketGenerator;

impl TicketGenerator for UuidTicketGenerator {
    fn generate(&self, vehicle: &Vehicle, spot: &Spot, floor_id: &str) -> Ticket {
        Ticket {
            id: TicketId::new(),
            vehicle: vehicle.clone(),
            spot_id: spot.id().to_string(),
            spot_type: spot.spot_type(),
            floor_id: floor_id.to_string(),
            entry_time: Utc::now(),
        }
    }
}
