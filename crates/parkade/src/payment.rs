//! Payment settlement.
//!
//! The exit panel calls this once per release. A `false` result is terminal
//! for that release; retrying payment is the processor's concern.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::cost::Amount;

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn process_payment(&self, amount: Amount) -> bool;
}

/// Card terminal that approves every charge and keeps a running total.
#[derive(Debug, Default)]
pub struct CardPaymentProcessor {
    settled_cents: AtomicU64,
}

impl CardPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_settled(&self) -> Amount {
        Amount::from_cents(self.settled_cents.load(Ordering::Acquire))
    }
}

#[async_trait]
impl PaymentProcessor for CardPaymentProcessor {
    async fn process_payment(&self, amount: Amount) -> bool {
        self.settled_cents
            .fetch_add(amount.cents(), Ordering::AcqRel);
        tracing::info!(%amount, "Card payment approved");
        true
    }
}

/// Declines everything. Useful for exercising failed exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclinedPaymentProcessor;

#[async_trait]
impl PaymentProcessor for DeclinedPaymentProcessor {
    async fn process_payment(&self, amount: Amount) -> bool {
        tracing::warn!(%amount, "Payment declined");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn card_accumulates_settled_amounts() {
        let card = CardPaymentProcessor::new();
        assert!(card.process_payment(Amount::from_cents(500)).await);
        assert!(card.process_payment(Amount::from_cents(1250)).await);
        assert_eq!(card.total_settled(), Amount::from_cents(1750));
    }

    #[tokio::test]
    async fn declined_never_settles() {
        assert!(!DeclinedPaymentProcessor.process_payment(Amount::from_cents(1)).await);
    }
}
