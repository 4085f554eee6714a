//! Vehicles and the spot classes they can occupy.

use serde::{Deserialize, Serialize};

/// Size class of a parking spot.
///
/// Ordering is the scan order used by floors: smaller spots are offered first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotType {
    Small,
    Medium,
    Large,
}

impl SpotType {
    pub const ALL: [SpotType; 3] = [SpotType::Small, SpotType::Medium, SpotType::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "SMALL",
            Self::Medium => "MEDIUM",
            Self::Large => "LARGE",
        }
    }
}

impl std::fmt::Display for SpotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Car,
    Bus,
    Truck,
}

impl VehicleType {
    /// Cars take small or medium spots; buses and trucks need a large one.
    pub fn fits(&self, spot_type: SpotType) -> bool {
        match self {
            Self::Car => matches!(spot_type, SpotType::Small | SpotType::Medium),
            Self::Bus | Self::Truck => spot_type == SpotType::Large,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "CAR",
            Self::Bus => "BUS",
            Self::Truck => "TRUCK",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requester identified by its plate. Carries no allocation state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    license_plate: String,
    vehicle_type: VehicleType,
}

impl Vehicle {
    pub fn new(license_plate: impl Into<String>, vehicle_type: VehicleType) -> Self {
        Self {
            license_plate: license_plate.into(),
            vehicle_type,
        }
    }

    pub fn car(license_plate: impl Into<String>) -> Self {
        Self::new(license_plate, VehicleType::Car)
    }

    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }
}
