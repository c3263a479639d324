//! Listener interface for discount notices and the fan-out dispatcher.
//!
//! Each matched rule is delivered as `(outcome, message)`; a purchase that matched nothing is
//! delivered through [`DiscountNotifier::notify_no_match`]. A failing listener is logged and
//! never stops delivery to the remaining ones.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{format_cents, DiscountKind, DiscountOutcome, FactSet};

/// Callback interface receiving discount decisions.
pub trait DiscountNotifier: Send + Sync {
    fn notify_discount(&self, outcome: &DiscountOutcome, message: &str) -> Result<(), NotifyError>;

    fn notify_no_match(&self, facts: &FactSet) -> Result<(), NotifyError>;

    /// Human-readable name used in diagnostics.
    fn channel_name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
    #[error("{failed} of {attempted} notification channels failed")]
    Partial { failed: usize, attempted: usize },
}

/// Renders the customer-facing notice for a matched outcome.
pub fn render_notice(outcome: &DiscountOutcome, message: &str) -> String {
    let amount = format_cents(outcome.purchase_amount);
    match outcome.discount_type {
        DiscountKind::NoDiscount => {
            format!("No discount on your {amount} purchase. {message}")
        }
        _ if outcome.applied_immediately => format!(
            "{}% off applied to your {amount} purchase. {message}",
            outcome.discount_percentage
        ),
        _ => format!(
            "{}% off your next purchase (earned on {amount}). {message}",
            outcome.discount_percentage
        ),
    }
}

/// Renders the notice for a purchase that matched no rule.
pub fn render_no_match(facts: &FactSet) -> String {
    format!(
        "No discount rule matched the {} purchase (lifetime {}, this week {}).",
        format_cents(facts.current_purchase_amount),
        format_cents(facts.total_purchases),
        format_cents(facts.weekly_purchases)
    )
}

/// Writes notices to the tracing stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl DiscountNotifier for TracingNotifier {
    fn notify_discount(&self, outcome: &DiscountOutcome, message: &str) -> Result<(), NotifyError> {
        info!(
            customer_id = %outcome.customer_id,
            discount = outcome.discount_type.label(),
            percentage = outcome.discount_percentage,
            notice = %render_notice(outcome, message),
            "discount notice"
        );
        Ok(())
    }

    fn notify_no_match(&self, facts: &FactSet) -> Result<(), NotifyError> {
        info!(
            customer_id = %facts.customer_id,
            notice = %render_no_match(facts),
            "no discount matched"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "tracing"
    }
}

/// A notice as captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Discount {
        outcome: DiscountOutcome,
        message: String,
    },
    NoMatch {
        facts: FactSet,
    },
}

/// Keeps every notice in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn discounts(&self) -> Vec<DiscountOutcome> {
        self.notices()
            .into_iter()
            .filter_map(|notice| match notice {
                Notice::Discount { outcome, .. } => Some(outcome),
                Notice::NoMatch { .. } => None,
            })
            .collect()
    }

    fn push(&self, notice: Notice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .map_err(|_| NotifyError::Unavailable("recording notifier lock poisoned".to_string()))?
            .push(notice);
        Ok(())
    }
}

impl DiscountNotifier for RecordingNotifier {
    fn notify_discount(&self, outcome: &DiscountOutcome, message: &str) -> Result<(), NotifyError> {
        self.push(Notice::Discount {
            outcome: outcome.clone(),
            message: message.to_string(),
        })
    }

    fn notify_no_match(&self, facts: &FactSet) -> Result<(), NotifyError> {
        self.push(Notice::NoMatch {
            facts: facts.clone(),
        })
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}

/// Delivers every notice to all registered listeners.
#[derive(Default, Clone)]
pub struct NotificationDispatcher {
    listeners: Vec<Arc<dyn DiscountNotifier>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: Arc<dyn DiscountNotifier>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn register(&mut self, listener: Arc<dyn DiscountNotifier>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn fan_out<F>(&self, deliver: F) -> Result<(), NotifyError>
    where
        F: Fn(&dyn DiscountNotifier) -> Result<(), NotifyError>,
    {
        let mut failed = 0;
        for listener in &self.listeners {
            if let Err(error) = deliver(listener.as_ref()) {
                failed += 1;
                warn!(channel = listener.channel_name(), %error, "notification delivery failed");
            }
        }

        if failed == 0 {
            Ok(())
        } else {
            Err(NotifyError::Partial {
                failed,
                attempted: self.listeners.len(),
            })
        }
    }
}

impl DiscountNotifier for NotificationDispatcher {
    fn notify_discount(&self, outcome: &DiscountOutcome, message: &str) -> Result<(), NotifyError> {
        self.fan_out(|listener| listener.notify_discount(outcome, message))
    }

    fn notify_no_match(&self, facts: &FactSet) -> Result<(), NotifyError> {
        self.fan_out(|listener| listener.notify_no_match(facts))
    }

    fn channel_name(&self) -> &str {
        "dispatcher"
    }
}
