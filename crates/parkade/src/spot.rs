//! Spot - the individually lockable unit of allocation.
//!
//! Each spot owns its own `RwLock`. There is no lot-wide lock, so reservations
//! on different spots never contend with each other.
//!
//! Reservation is a two-step protocol:
//! - `can_fit()` is an advisory peek under the read guard. Any number of
//!   searchers may peek at once and the answer may be stale by the time it
//!   is acted on.
//! - `try_reserve()` re-checks under the write guard and commits. Only one
//!   caller can move a spot from free to occupied.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::vehicle::{SpotType, Vehicle};

/// Occupancy is the occupant itself; a spot is occupied iff it has one.
#[derive(Debug, Default)]
struct SpotState {
    occupant: Option<Vehicle>,
}

#[derive(Debug)]
pub struct Spot {
    id: String,
    spot_type: SpotType,
    state: RwLock<SpotState>,
}

impl Spot {
    pub fn new(id: impl Into<String>, spot_type: SpotType) -> Self {
        Self {
            id: id.into(),
            spot_type,
            state: RwLock::new(SpotState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn spot_type(&self) -> SpotType {
        self.spot_type
    }

    /// A poisoned guard still holds a consistent `Option`, so recover it.
    fn read_state(&self) -> RwLockReadGuard<'_, SpotState> {
        self.state.read().unwrap_or_else(|poisoned| {
            tracing::error!(spot = %self.id, "Spot lock poisoned - recovering state");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SpotState> {
        self.state.write().unwrap_or_else(|poisoned| {
            tracing::error!(spot = %self.id, "Spot lock poisoned - recovering state");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Advisory check: free and the right size. Never binding.
    pub fn can_fit(&self, vehicle: &Vehicle) -> bool {
        let state = self.read_state();
        state.occupant.is_none() && vehicle.vehicle_type().fits(self.spot_type)
    }

    /// Atomically claim the spot for `vehicle`.
    ///
    /// Returns `false` with no side effects if the spot is taken or the
    /// vehicle does not fit.
    pub fn try_reserve(&self, vehicle: &Vehicle) -> bool {
        if !vehicle.vehicle_type().fits(self.spot_type) {
            return false;
        }

        let mut state = self.write_state();
        if state.occupant.is_some() {
            return false;
        }
        state.occupant = Some(vehicle.clone());
        true
    }

    /// Free the spot. Releasing a free spot is a no-op.
    pub fn release(&self) {
        let previous = self.write_state().occupant.take();
        if let Some(vehicle) = previous {
            tracing::debug!(spot = %self.id, plate = %vehicle.license_plate(), "Spot released");
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.read_state().occupant.is_some()
    }

    pub fn occupant(&self) -> Option<Vehicle> {
        self.read_state().occupant.clone()
    }
}
