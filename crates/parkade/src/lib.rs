//! parkade: concurrent parking spot allocation.
//!
//! Vehicles race for spots through an entry panel that peeks with a
//! strategy, commits under the spot's own lock, and retries a bounded number
//! of times when it loses. Exit panels claim the ticket, free the spot, and
//! settle payment.

mod config;
mod cost;
mod floor;
mod lot;
mod payment;
mod registry;
mod spot;
mod status;
mod ticket;
mod vehicle;

pub mod panel;
pub mod service;
pub mod strategy;

pub use config::{AdmissionConfig, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
pub use cost::{Amount, CostStrategy, PremiumCost, RateCard, StandardCost};
pub use floor::Floor;
pub use lot::{LotError, ParkingLot};
pub use panel::{AdmissionError, AdmissionState, EntryPanel, ExitPanel, Receipt, ReleaseError};
pub use payment::{CardPaymentProcessor, DeclinedPaymentProcessor, PaymentProcessor};
pub use registry::{RegistryError, TicketRegistry};
pub use service::LotService;
pub use spot::Spot;
pub use status::{AvailableSpots, FloorStatus, LotStatus};
pub use strategy::{NearestAvailable, RandomSpot, SpotStrategy, StrategyKind, UnknownStrategy};
pub use ticket::{Ticket, TicketGenerator, TicketId, UuidTicketGenerator};
pub use vehicle::{SpotType, Vehicle, VehicleType};
