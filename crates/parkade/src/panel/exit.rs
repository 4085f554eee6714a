//! Exit panel - release, costing, and payment.
//!
//! The ticket is claimed (removed from the registry) before anything else,
//! so two panels presented with the same ticket can never both release it.
//! A failed payment does not put the vehicle back: the spot stays free and
//! the outcome reports the amount that was owed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cost::{Amount, CostStrategy};
use crate::lot::ParkingLot;
use crate::payment::PaymentProcessor;
use crate::ticket::{Ticket, TicketId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReleaseError {
    /// Malformed id, or no active ticket with that id.
    #[error("Invalid parking ticket: {0}")]
    InvalidTicket(String),
    /// The ticket names a spot the lot does not have.
    #[error("Parking spot not found: {0}")]
    SpotNotFound(String),
    /// The spot was released but the charge was not settled.
    #[error("Payment of {amount} failed for ticket {ticket}")]
    PaymentFailed { ticket: TicketId, amount: Amount },
}

/// Proof of a completed exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub ticket: Ticket,
    pub amount: Amount,
    pub exit_time: DateTime<Utc>,
}

pub struct ExitPanel {
    payment: Arc<dyn PaymentProcessor>,
    cost: Arc<dyn CostStrategy>,
}

impl ExitPanel {
    pub fn new(payment: Arc<dyn PaymentProcessor>, cost: Arc<dyn CostStrategy>) -> Self {
        Self { payment, cost }
    }

    pub async fn release(&self, ticket_id: &str, lot: &ParkingLot) -> Result<Receipt, ReleaseError> {
        self.release_at(ticket_id, lot, Utc::now()).await
    }

    /// Release with an explicit exit time.
    pub async fn release_at(
        &self,
        ticket_id: &str,
        lot: &ParkingLot,
        exit_time: DateTime<Utc>,
    ) -> Result<Receipt, ReleaseError> {
        let ticket = TicketId::parse(ticket_id)
            .ok()
            .and_then(|id| lot.registry().take(&id))
            .ok_or_else(|| {
                tracing::warn!(ticket = %ticket_id, "Invalid parking ticket presented");
                ReleaseError::InvalidTicket(ticket_id.to_string())
            })?;

        tracing::info!(
            ticket = %ticket.id,
            plate = %ticket.vehicle.license_plate(),
            "Ticket presented at exit"
        );

        let amount = self.cost.compute_cost(&ticket, exit_time);

        let Some(spot) = lot.spot_by_id(&ticket.spot_id) else {
            tracing::error!(
                ticket = %ticket.id,
                spot = %ticket.spot_id,
                "Ticket references a spot missing from the lot"
            );
            return Err(ReleaseError::SpotNotFound(ticket.spot_id));
        };
        spot.release();

        if !self.payment.process_payment(amount).await {
            tracing::warn!(ticket = %ticket.id, %amount, "Payment failed - spot already released");
            return Err(ReleaseError::PaymentFailed {
                ticket: ticket.id,
                amount,
            });
        }

        tracing::info!(
            ticket = %ticket.id,
            plate = %ticket.vehicle.license_plate(),
            spot = %ticket.spot_id,
            %amount,
            "Vehicle exited"
        );

        Ok(Receipt {
            ticket,
            amount,
            exit_time,
        })
    }
}
