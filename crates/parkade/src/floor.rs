//! Floor - a fixed set of spots grouped by size class.
//!
//! Spots are added during setup (`&mut self`); once the floor is shared in a
//! lot only the maintenance flag and the spots' own state change.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::spot::Spot;
use crate::vehicle::{SpotType, Vehicle};

#[derive(Debug)]
pub struct Floor {
    floor_id: String,
    spots: BTreeMap<SpotType, Vec<Arc<Spot>>>,
    under_maintenance: AtomicBool,
}

impl Floor {
    pub fn new(floor_id: impl Into<String>) -> Self {
        Self {
            floor_id: floor_id.into(),
            spots: SpotType::ALL.iter().map(|t| (*t, Vec::new())).collect(),
            under_maintenance: AtomicBool::new(false),
        }
    }

    /// Builder-style `add_spot` for setup code.
    pub fn with_spot(mut self, spot: Spot) -> Self {
        self.add_spot(spot);
        self
    }

    pub fn add_spot(&mut self, spot: Spot) {
        self.spots
            .entry(spot.spot_type())
            .or_default()
            .push(Arc::new(spot));
    }

    pub fn floor_id(&self) -> &str {
        &self.floor_id
    }

    pub fn is_under_maintenance(&self) -> bool {
        self.under_maintenance.load(Ordering::Acquire)
    }

    pub fn set_under_maintenance(&self, status: bool) {
        let previous = self.under_maintenance.swap(status, Ordering::AcqRel);
        if previous != status {
            tracing::info!(floor = %self.floor_id, under_maintenance = status, "Floor maintenance changed");
        }
    }

    /// First spot that currently fits `vehicle`, scanning small to large.
    ///
    /// Advisory: the spot may be taken before the caller reserves it.
    pub fn find_available(&self, vehicle: &Vehicle) -> Option<Arc<Spot>> {
        if self.is_under_maintenance() {
            return None;
        }

        self.spots()
            .find(|spot| spot.can_fit(vehicle))
            .map(Arc::clone)
    }

    /// Best-effort snapshot: true iff no spot was free when checked.
    pub fn is_full(&self) -> bool {
        self.spots().all(|spot| spot.is_occupied())
    }

    pub fn spot(&self, spot_id: &str) -> Option<Arc<Spot>> {
        self.spots().find(|spot| spot.id() == spot_id).map(Arc::clone)
    }

    pub fn spots(&self) -> impl Iterator<Item = &Arc<Spot>> {
        self.spots.values().flatten()
    }

    pub fn spots_of_type(&self, spot_type: SpotType) -> &[Arc<Spot>] {
        self.spots.get(&spot_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn capacity(&self) -> usize {
        self.spots.values().map(Vec::len).sum()
    }
}
