use chrono::Duration;

use super::domain::{Customer, FactSet, PurchaseEvent};

/// Applies purchases to customer totals and derives the fact set used for evaluation.
#[derive(Debug, Clone)]
pub struct PurchaseProcessor {
    weekly_window: Duration,
}

impl Default for PurchaseProcessor {
    fn default() -> Self {
        Self::new(Duration::days(7))
    }
}

impl PurchaseProcessor {
    pub fn new(weekly_window: Duration) -> Self {
        Self { weekly_window }
    }

    pub fn weekly_window(&self) -> Duration {
        self.weekly_window
    }

    /// Mutates `customer` with `event` and returns the post-purchase snapshot.
    ///
    /// The weekly total is a single bucket: a purchase within the window of the previous
    /// one accumulates, anything later restarts the bucket at this purchase's amount.
    pub fn apply(
        &self,
        customer: &mut Customer,
        event: &PurchaseEvent,
    ) -> Result<FactSet, PurchaseError> {
        if event.amount == 0 {
            return Err(PurchaseError::ZeroAmount);
        }

        customer.current_purchase_amount = event.amount;
        customer.total_purchases = customer.total_purchases.saturating_add(event.amount);

        let elapsed = event.timestamp - customer.last_purchase_at;
        customer.weekly_purchases = if elapsed <= self.weekly_window {
            customer.weekly_purchases.saturating_add(event.amount)
        } else {
            event.amount
        };

        customer.last_purchase_at = event.timestamp;

        Ok(customer.facts())
    }
}

/// Purchase rejected before any totals were touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    #[error("purchase amount must be greater than zero")]
    ZeroAmount,
}
