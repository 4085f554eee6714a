//! Entry and exit panels.
//!
//! Panels hold policy (strategy, pricing, payment) but no allocation state;
//! everything shared lives in the `ParkingLot` they are handed.

mod entry;
mod exit;

pub use entry::{AdmissionError, AdmissionState, EntryPanel};
pub use exit::{ExitPanel, Receipt, ReleaseError};
