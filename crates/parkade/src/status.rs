//! Occupancy snapshots for display boards and logs.
//!
//! Snapshots are best-effort: each spot is read under its own guard, so a
//! snapshot taken during heavy traffic need not correspond to a single instant.

use serde::Serialize;

use crate::floor::Floor;
use crate::vehicle::SpotType;

/// Free spots per size class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailableSpots {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl AvailableSpots {
    pub fn total(&self) -> usize {
        self.small + self.medium + self.large
    }

    fn bump(&mut self, spot_type: SpotType) {
        match spot_type {
            SpotType::Small => self.small += 1,
            SpotType::Medium => self.medium += 1,
            SpotType::Large => self.large += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorStatus {
    pub floor_id: String,
    pub under_maintenance: bool,
    pub available: AvailableSpots,
    pub occupied: usize,
}

impl FloorStatus {
    pub fn of(floor: &Floor) -> Self {
        let mut available = AvailableSpots::default();
        let mut occupied = 0;
        for spot in floor.spots() {
            if spot.is_occupied() {
                occupied += 1;
            } else {
                available.bump(spot.spot_type());
            }
        }

        Self {
            floor_id: floor.floor_id().to_string(),
            under_maintenance: floor.is_under_maintenance(),
            available,
            occupied,
        }
    }

    /// Free spots a driver could actually be sent to.
    pub fn bookable(&self) -> usize {
        if self.under_maintenance {
            0
        } else {
            self.available.total()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotStatus {
    pub floors: Vec<FloorStatus>,
    pub active_tickets: usize,
    pub is_full: bool,
}

impl LotStatus {
    pub fn bookable(&self) -> usize {
        self.floors.iter().map(FloorStatus::bookable).sum()
    }
}
