//! Spot selection policies.
//!
//! Strategies only peek at spot state through `Floor::find_available`. They
//! never reserve; the entry panel owns the commit.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::floor::Floor;
use crate::spot::Spot;
use crate::vehicle::Vehicle;

pub trait SpotStrategy: Send + Sync {
    /// Pick a candidate spot for `vehicle`, or `None` if no floor has one.
    fn find_spot(&self, vehicle: &Vehicle, floors: &[Arc<Floor>]) -> Option<Arc<Spot>>;

    fn name(&self) -> &'static str;
}

fn first_fit<'a>(
    vehicle: &Vehicle,
    floors: impl IntoIterator<Item = &'a Arc<Floor>>,
) -> Option<Arc<Spot>> {
    floors
        .into_iter()
        .filter(|floor| !floor.is_under_maintenance())
        .find_map(|floor| floor.find_available(vehicle))
}

/// Floors in lot order; the first floor with a fit wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestAvailable;

impl SpotStrategy for NearestAvailable {
    fn find_spot(&self, vehicle: &Vehicle, floors: &[Arc<Floor>]) -> Option<Arc<Spot>> {
        first_fit(vehicle, floors)
    }

    fn name(&self) -> &'static str {
        "nearest"
    }
}

/// Shuffles floor order per call to spread contention across floors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSpot;

impl SpotStrategy for RandomSpot {
    fn find_spot(&self, vehicle: &Vehicle, floors: &[Arc<Floor>]) -> Option<Arc<Spot>> {
        let mut order: Vec<&Arc<Floor>> = floors.iter().collect();
        order.shuffle(&mut rand::thread_rng());
        first_fit(vehicle, order)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Strategy selector for configuration and the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyKind {
    #[default]
    Nearest,
    Random,
}

impl StrategyKind {
    pub fn build(self) -> Arc<dyn SpotStrategy> {
        match self {
            Self::Nearest => Arc::new(NearestAvailable),
            Self::Random => Arc::new(RandomSpot),
        }
    }

    /// Matches the built strategy's `name()`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown strategy '{0}', expected 'nearest' or 'random'")]
pub struct UnknownStrategy(String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "random" => Ok(Self::Random),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}
