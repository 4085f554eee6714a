//! Entry panel - admission with bounded retry.
//!
//! Admission turns the non-atomic "find a spot, then claim it" sequence into
//! an effectively atomic allocation:
//!
//! ```text
//! Searching --candidate--> Reserving --won--> Issued
//!     ^                        |
//!     |                       lost
//!     |                        v
//!   Retry <--attempts left-- (bound reached) --> Exhausted
//! ```
//!
//! A search that finds nothing ends admission immediately with
//! `NoCandidate`; only lost races are retried, and every retry asks the
//! strategy for a fresh candidate.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::AdmissionConfig;
use crate::lot::ParkingLot;
use crate::registry::RegistryError;
use crate::spot::Spot;
use crate::strategy::SpotStrategy;
use crate::ticket::{Ticket, TicketGenerator, TicketId, UuidTicketGenerator};
use crate::vehicle::Vehicle;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    /// No floor offered a free spot that fits. Not retried.
    #[error("No available spot for this vehicle")]
    NoCandidate,
    /// Every reservation attempt lost to a concurrent vehicle.
    #[error("Lost the race for a spot {attempts} times")]
    RetriesExhausted { attempts: u32 },
    /// The strategy offered a spot this lot does not index.
    #[error("Spot {0} is not part of this lot")]
    UnknownSpot(String),
    /// The ticket generator reused an id that is still active.
    #[error("Ticket {0} is already active")]
    DuplicateTicket(TicketId),
}

impl AdmissionError {
    /// Whether asking again later could succeed without any car leaving.
    pub fn is_contention(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

/// Admission state machine.
#[derive(Debug)]
pub enum AdmissionState {
    Searching,
    Reserving(Arc<Spot>),
    Retry,
    Issued(Ticket),
    Exhausted,
}

pub struct EntryPanel {
    strategy: RwLock<Arc<dyn SpotStrategy>>,
    tickets: Arc<dyn TicketGenerator>,
    config: AdmissionConfig,
}

impl EntryPanel {
    pub fn new(strategy: Arc<dyn SpotStrategy>) -> Self {
        Self::with_generator(strategy, Arc::new(UuidTicketGenerator))
    }

    pub fn with_generator(
        strategy: Arc<dyn SpotStrategy>,
        tickets: Arc<dyn TicketGenerator>,
    ) -> Self {
        Self {
            strategy: RwLock::new(strategy),
            tickets,
            config: AdmissionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AdmissionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Swap the selection policy. Admissions already running keep the old one.
    pub fn change_strategy(&self, strategy: Arc<dyn SpotStrategy>) {
        let name = strategy.name();
        *self
            .strategy
            .write()
            .unwrap_or_else(PoisonError::into_inner) = strategy;
        tracing::info!(strategy = name, "Entry strategy changed");
    }

    pub fn strategy(&self) -> Arc<dyn SpotStrategy> {
        Arc::clone(&self.strategy.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Find and atomically reserve a spot for `vehicle`, then issue a ticket.
    pub async fn admit(&self, vehicle: &Vehicle, lot: &ParkingLot) -> Result<Ticket, AdmissionError> {
        let strategy = self.strategy();
        let plate = vehicle.license_plate();
        let mut attempts = 0u32;
        let mut state = AdmissionState::Searching;

        loop {
            state = match state {
                AdmissionState::Searching => match strategy.find_spot(vehicle, lot.floors()) {
                    Some(spot) => AdmissionState::Reserving(spot),
                    None => {
                        tracing::info!(%plate, strategy = strategy.name(), "No available spot");
                        return Err(AdmissionError::NoCandidate);
                    }
                },
                AdmissionState::Reserving(spot) => {
                    attempts += 1;
                    if spot.try_reserve(vehicle) {
                        tracing::debug!(%plate, spot = %spot.id(), attempt = attempts, "Spot reserved");
                        AdmissionState::Issued(self.issue(vehicle, &spot, lot)?)
                    } else if attempts >= self.config.max_retries {
                        AdmissionState::Exhausted
                    } else {
                        tracing::info!(
                            %plate,
                            spot = %spot.id(),
                            attempt = attempts,
                            "Spot taken by another vehicle, retrying"
                        );
                        AdmissionState::Retry
                    }
                }
                AdmissionState::Retry => {
                    tokio::time::sleep(self.config.retry_delay).await;
                    AdmissionState::Searching
                }
                AdmissionState::Issued(ticket) => return Ok(ticket),
                AdmissionState::Exhausted => {
                    tracing::warn!(%plate, attempts, "Admission failed after max retries");
                    return Err(AdmissionError::RetriesExhausted { attempts });
                }
            };
        }
    }

    /// Bind a ticket to a spot this vehicle already holds.
    ///
    /// On any failure the spot is handed back so it is never left occupied
    /// without an active ticket.
    fn issue(&self, vehicle: &Vehicle, spot: &Spot, lot: &ParkingLot) -> Result<Ticket, AdmissionError> {
        let Some(floor_id) = lot.floor_of(spot.id()) else {
            spot.release();
            tracing::error!(spot = %spot.id(), "Strategy returned a spot outside the lot");
            return Err(AdmissionError::UnknownSpot(spot.id().to_string()));
        };

        let ticket = self.tickets.generate(vehicle, spot, floor_id);
        if let Err(RegistryError::Duplicate(id)) = lot.registry().register(ticket.clone()) {
            spot.release();
            tracing::error!(ticket = %id, spot = %spot.id(), "Ticket id collision - spot returned");
            return Err(AdmissionError::DuplicateTicket(id));
        }

        tracing::info!(
            ticket = %ticket.id,
            plate = %vehicle.license_plate(),
            spot = %ticket.spot_id,
            floor = %ticket.floor_id,
            entry_time = %ticket.entry_time,
            "Ticket issued"
        );
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use super::*;
    use crate::floor::Floor;
    use crate::strategy::{NearestAvailable, RandomSpot};
    use crate::vehicle::{SpotType, VehicleType};

    /// Hands out a fixed sequence of candidates, then nothing.
    struct ScriptedStrategy {
        candidates: Mutex<VecDeque<Arc<Spot>>>,
        calls: AtomicUsize,
    }

    impl ScriptedStrategy {
        fn new(candidates: Vec<Arc<Spot>>) -> Arc<Self> {
            Arc::new(Self {
                candidates: Mutex::new(candidates.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SpotStrategy for ScriptedStrategy {
        fn find_spot(&self, _vehicle: &Vehicle, _floors: &[Arc<Floor>]) -> Option<Arc<Spot>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.candidates.lock().unwrap().pop_front()
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    /// Always returns the ticket id it was built with.
    struct FixedIdGenerator(TicketId);

    impl TicketGenerator for FixedIdGenerator {
        fn generate(&self, vehicle: &Vehicle, spot: &Spot, floor_id: &str) -> Ticket {
            let mut ticket = UuidTicketGenerator.generate(vehicle, spot, floor_id);
            ticket.id = self.0;
            ticket
        }
    }

    fn lot() -> ParkingLot {
        ParkingLot::new()
            .with_floor(
                Floor::new("F1")
                    .with_spot(Spot::new("F1-S1", SpotType::Small))
                    .with_spot(Spot::new("F1-S2", SpotType::Medium))
                    .with_spot(Spot::new("F1-S3", SpotType::Large)),
            )
            .unwrap()
    }

    fn fast() -> AdmissionConfig {
        AdmissionConfig::default()
            .with_max_retries(3)
            .with_retry_delay(Duration::ZERO)
    }

    /// A spot in `lot` that is already held, so reserving it always loses.
    fn taken(lot: &ParkingLot, id: &str) -> Arc<Spot> {
        let spot = lot.spot_by_id(id).unwrap();
        spot.try_reserve(&Vehicle::new("HOLDER", VehicleType::Bus));
        spot.try_reserve(&Vehicle::car("HOLDER"));
        spot
    }

    #[tokio::test]
    async fn admits_and_registers_ticket() {
        let lot = lot();
        let panel = EntryPanel::new(Arc::new(NearestAvailable)).with_config(fast());
        let car = Vehicle::car("KA-01-1234");

        let ticket = panel.admit(&car, &lot).await.unwrap();

        assert_eq!(ticket.spot_id, "F1-S1");
        assert_eq!(ticket.floor_id, "F1");
        assert_eq!(ticket.vehicle, car);
        assert_eq!(lot.registry().get(&ticket.id), Some(ticket.clone()));
        assert_eq!(lot.spot_by_id("F1-S1").unwrap().occupant(), Some(car));
    }

    #[tokio::test]
    async fn no_candidate_fails_without_retry() {
        let lot = lot();
        let strategy = ScriptedStrategy::new(vec![]);
        let panel = EntryPanel::new(strategy.clone()).with_config(
            AdmissionConfig::default().with_retry_delay(Duration::from_secs(5)),
        );

        let started = Instant::now();
        let err = panel.admit(&Vehicle::car("A"), &lot).await.unwrap_err();

        assert_eq!(err, AdmissionError::NoCandidate);
        assert!(!err.is_contention());
        assert_eq!(strategy.calls(), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(lot.registry().is_empty());
    }

    #[tokio::test]
    async fn lost_races_are_retried_with_fresh_candidates() {
        let lot = lot();
        let s1 = taken(&lot, "F1-S1");
        let s3 = taken(&lot, "F1-S3");
        let free = lot.spot_by_id("F1-S2").unwrap();
        let strategy = ScriptedStrategy::new(vec![s1, s3, Arc::clone(&free)]);
        let panel = EntryPanel::new(strategy.clone()).with_config(fast());

        let ticket = panel.admit(&Vehicle::car("A"), &lot).await.unwrap();

        assert_eq!(ticket.spot_id, "F1-S2");
        assert_eq!(strategy.calls(), 3);
        assert!(free.is_occupied());
    }

    #[tokio::test]
    async fn retry_bound_is_respected() {
        let lot = lot();
        let s1 = taken(&lot, "F1-S1");
        let free = lot.spot_by_id("F1-S2").unwrap();
        let strategy = ScriptedStrategy::new(vec![
            Arc::clone(&s1),
            Arc::clone(&s1),
            Arc::clone(&s1),
            Arc::clone(&free),
        ]);
        let panel = EntryPanel::new(strategy.clone()).with_config(fast());

        let err = panel.admit(&Vehicle::car("A"), &lot).await.unwrap_err();

        assert_eq!(err, AdmissionError::RetriesExhausted { attempts: 3 });
        assert!(err.is_contention());
        assert_eq!(strategy.calls(), 3);
        assert!(!free.is_occupied());
        assert!(lot.registry().is_empty());
    }

    #[tokio::test]
    async fn retry_waits_between_attempts() {
        let lot = lot();
        let s1 = taken(&lot, "F1-S1");
        let free = lot.spot_by_id("F1-S2").unwrap();
        let strategy = ScriptedStrategy::new(vec![Arc::clone(&s1), Arc::clone(&s1), free]);
        let delay = Duration::from_millis(20);
        let panel = EntryPanel::new(strategy)
            .with_config(AdmissionConfig::default().with_max_retries(3).with_retry_delay(delay));

        let started = Instant::now();
        panel.admit(&Vehicle::car("A"), &lot).await.unwrap();
        assert!(started.elapsed() >= delay * 2);
    }

    #[tokio::test]
    async fn duplicate_ticket_returns_the_spot() {
        let lot = lot();
        let id = TicketId::new();
        let panel = EntryPanel::with_generator(
            Arc::new(NearestAvailable),
            Arc::new(FixedIdGenerator(id)),
        )
        .with_config(fast());

        let first = panel.admit(&Vehicle::car("A"), &lot).await.unwrap();
        assert_eq!(first.id, id);

        let err = panel.admit(&Vehicle::car("B"), &lot).await.unwrap_err();
        assert_eq!(err, AdmissionError::DuplicateTicket(id));
        assert!(!lot.spot_by_id("F1-S2").unwrap().is_occupied());
        assert_eq!(lot.registry().len(), 1);
    }

    #[tokio::test]
    async fn foreign_spot_is_released() {
        let lot = lot();
        let stray = Arc::new(Spot::new("X-1", SpotType::Small));
        let panel = EntryPanel::new(ScriptedStrategy::new(vec![Arc::clone(&stray)]))
            .with_config(fast());

        let err = panel.admit(&Vehicle::car("A"), &lot).await.unwrap_err();
        assert_eq!(err, AdmissionError::UnknownSpot("X-1".to_string()));
        assert!(!stray.is_occupied());
    }

    #[tokio::test]
    async fn change_strategy_applies_to_next_admission() {
        let lot = lot();
        let panel = EntryPanel::new(Arc::new(NearestAvailable)).with_config(fast());
        assert_eq!(panel.strategy().name(), "nearest");

        panel.change_strategy(Arc::new(RandomSpot));
        assert_eq!(panel.strategy().name(), "random");

        let truck = Vehicle::new("KA-99-8888", VehicleType::Truck);
        assert_eq!(panel.admit(&truck, &lot).await.unwrap().spot_id, "F1-S3");
    }

    #[tokio::test]
    async fn full_release_reuse() {
        let lot = ParkingLot::new()
            .with_floor(Floor::new("F1").with_spot(Spot::new("F1-S1", SpotType::Small)))
            .unwrap();
        let panel = EntryPanel::new(Arc::new(NearestAvailable)).with_config(fast());

        let first = panel.admit(&Vehicle::car("A"), &lot).await.unwrap();
        assert_eq!(
            panel.admit(&Vehicle::car("B"), &lot).await.unwrap_err(),
            AdmissionError::NoCandidate
        );

        lot.registry().take(&first.id);
        lot.spot_by_id(&first.spot_id).unwrap().release();

        let second = panel.admit(&Vehicle::car("B"), &lot).await.unwrap();
        assert_eq!(second.spot_id, first.spot_id);
        assert_ne!(second.id, first.id);
    }
}
