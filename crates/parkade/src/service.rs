//! LotService: one lot with its entry and exit panels.
//!
//! The service is the handle callers share across tasks. It owns:
//! - The lot (floors, spot index, ticket registry) behind an `Arc`
//! - The entry panel (strategy, admission config, ticket generator)
//! - The exit panel (pricing, payment)

use std::sync::Arc;

use crate::config::AdmissionConfig;
use crate::cost::{CostStrategy, StandardCost};
use crate::lot::ParkingLot;
use crate::panel::{AdmissionError, EntryPanel, ExitPanel, Receipt, ReleaseError};
use crate::payment::{CardPaymentProcessor, PaymentProcessor};
use crate::status::LotStatus;
use crate::strategy::{NearestAvailable, SpotStrategy};
use crate::ticket::Ticket;
use crate::vehicle::Vehicle;

pub struct LotService {
    lot: Arc<ParkingLot>,
    entry: EntryPanel,
    exit: ExitPanel,
}

impl LotService {
    /// Nearest-available admission, standard pricing, card payments.
    pub fn new(lot: ParkingLot) -> Self {
        Self {
            lot: Arc::new(lot),
            entry: EntryPanel::new(Arc::new(NearestAvailable)),
            exit: ExitPanel::new(
                Arc::new(CardPaymentProcessor::new()),
                Arc::new(StandardCost::default()),
            ),
        }
    }

    pub fn with_entry(mut self, entry: EntryPanel) -> Self {
        self.entry = entry;
        self
    }

    pub fn with_exit(mut self, exit: ExitPanel) -> Self {
        self.exit = exit;
        self
    }

    pub fn with_strategy(self, strategy: Arc<dyn SpotStrategy>) -> Self {
        self.entry.change_strategy(strategy);
        self
    }

    pub fn with_admission_config(mut self, config: AdmissionConfig) -> Self {
        self.entry = self.entry.with_config(config);
        self
    }

    pub fn with_billing(
        self,
        payment: Arc<dyn PaymentProcessor>,
        cost: Arc<dyn CostStrategy>,
    ) -> Self {
        self.with_exit(ExitPanel::new(payment, cost))
    }

    pub fn lot(&self) -> &Arc<ParkingLot> {
        &self.lot
    }

    pub fn entry(&self) -> &EntryPanel {
        &self.entry
    }

    pub async fn park(&self, vehicle: &Vehicle) -> Result<Ticket, AdmissionError> {
        self.entry.admit(vehicle, &self.lot).await
    }

    pub async fn unpark(&self, ticket_id: &str) -> Result<Receipt, ReleaseError> {
        self.exit.release(ticket_id, &self.lot).await
    }

    pub fn change_strategy(&self, strategy: Arc<dyn SpotStrategy>) {
        self.entry.change_strategy(strategy);
    }

    /// Toggle maintenance on a floor. Returns `false` for an unknown floor.
    pub fn set_floor_maintenance(&self, floor_id: &str, under_maintenance: bool) -> bool {
        match self.lot.floor(floor_id) {
            Some(floor) => {
                floor.set_under_maintenance(under_maintenance);
                true
            }
            None => {
                tracing::warn!(floor = %floor_id, "Maintenance requested for unknown floor");
                false
            }
        }
    }

    pub fn status(&self) -> LotStatus {
        self.lot.status()
    }

    /// Log the per-floor display boards.
    pub fn show_status(&self) -> LotStatus {
        let status = self.status();
        for floor in &status.floors {
            tracing::info!(
                floor = %floor.floor_id,
                under_maintenance = floor.under_maintenance,
                small = floor.available.small,
                medium = floor.available.medium,
                large = floor.available.large,
                occupied = floor.occupied,
                "Floor display"
            );
        }
        tracing::info!(
            active_tickets = status.active_tickets,
            is_full = status.is_full,
            "Lot status"
        );
        status
    }
}
