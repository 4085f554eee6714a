//! ParkingLot - floors, a spot index, and the active ticket registry.
//!
//! Floors are added during setup. After the lot is wrapped in an `Arc` the
//! floor list and index are read-only; all mutation happens inside spots,
//! floor maintenance flags, and the registry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::floor::Floor;
use crate::registry::TicketRegistry;
use crate::spot::Spot;
use crate::status::{FloorStatus, LotStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LotError {
    #[error("floor '{0}' already exists")]
    DuplicateFloor(String),
    #[error("spot '{spot_id}' on floor '{floor_id}' already exists")]
    DuplicateSpot { spot_id: String, floor_id: String },
}

#[derive(Debug, Clone)]
struct IndexedSpot {
    spot: Arc<Spot>,
    floor_id: String,
}

#[derive(Debug, Default)]
pub struct ParkingLot {
    floors: Vec<Arc<Floor>>,
    spot_index: HashMap<String, IndexedSpot>,
    registry: TicketRegistry,
}

impl ParkingLot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a floor. Floor and spot ids must be unique across the lot.
    ///
    /// Floors keep insertion order, which is the "nearest" order.
    pub fn add_floor(&mut self, floor: Floor) -> Result<(), LotError> {
        if self.floor(floor.floor_id()).is_some() {
            return Err(LotError::DuplicateFloor(floor.floor_id().to_string()));
        }
        let duplicate = {
            let mut seen = HashSet::new();
            floor
                .spots()
                .find(|spot| self.spot_index.contains_key(spot.id()) || !seen.insert(spot.id()))
                .map(|spot| spot.id().to_string())
        };
        if let Some(spot_id) = duplicate {
            return Err(LotError::DuplicateSpot {
                spot_id,
                floor_id: floor.floor_id().to_string(),
            });
        }

        for spot in floor.spots() {
            self.spot_index.insert(
                spot.id().to_string(),
                IndexedSpot {
                    spot: Arc::clone(spot),
                    floor_id: floor.floor_id().to_string(),
                },
            );
        }
        tracing::debug!(floor = %floor.floor_id(), spots = floor.capacity(), "Floor added");
        self.floors.push(Arc::new(floor));
        Ok(())
    }

    pub fn with_floor(mut self, floor: Floor) -> Result<Self, LotError> {
        self.add_floor(floor)?;
        Ok(self)
    }

    pub fn floors(&self) -> &[Arc<Floor>] {
        &self.floors
    }

    pub fn floor(&self, floor_id: &str) -> Option<&Arc<Floor>> {
        self.floors.iter().find(|f| f.floor_id() == floor_id)
    }

    pub fn spot_by_id(&self, spot_id: &str) -> Option<Arc<Spot>> {
        self.spot_index
            .get(spot_id)
            .map(|entry| Arc::clone(&entry.spot))
    }

    /// Floor that owns `spot_id`.
    pub fn floor_of(&self, spot_id: &str) -> Option<&str> {
        self.spot_index
            .get(spot_id)
            .map(|entry| entry.floor_id.as_str())
    }

    pub fn registry(&self) -> &TicketRegistry {
        &self.registry
    }

    /// Every floor full, maintenance or not. An empty lot is full.
    pub fn is_full(&self) -> bool {
        self.floors.iter().all(|floor| floor.is_full())
    }

    pub fn capacity(&self) -> usize {
        self.spot_index.len()
    }

    pub fn status(&self) -> LotStatus {
        LotStatus {
            floors: self.floors.iter().map(|f| FloorStatus::of(f)).collect(),
            active_tickets: self.registry.len(),
            is_full: self.is_full(),
        }
    }
}
