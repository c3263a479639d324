use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::DiscountConfig;

use super::domain::{
    Customer, CustomerId, DiscountKind, DiscountOutcome, FactSet, MoneyCents, PurchaseEvent,
};
use super::evaluation::{DiscountMatch, DiscountRule, EvaluationEngine, EvaluationError};
use super::notifications::DiscountNotifier;
use super::processor::{PurchaseError, PurchaseProcessor};
use super::repository::{CustomerRepository, RepositoryError};

/// Service composing the customer store, purchase processor, rule engine and notifier.
///
/// Purchases are handled one at a time and to completion: update the store, derive the
/// facts, evaluate the rules, then notify.
pub struct DiscountService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    processor: PurchaseProcessor,
    engine: EvaluationEngine,
}

impl<R, N> DiscountService<R, N>
where
    R: CustomerRepository + 'static,
    N: DiscountNotifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        config: &DiscountConfig,
    ) -> Result<Self, DiscountServiceError> {
        let engine =
            EvaluationEngine::new(&config.evaluation).map_err(DiscountServiceError::InvalidRules)?;
        let processor = PurchaseProcessor::new(config.weekly_window());
        Ok(Self::with_engine(repository, notifier, processor, engine))
    }

    pub fn with_engine(
        repository: Arc<R>,
        notifier: Arc<N>,
        processor: PurchaseProcessor,
        engine: EvaluationEngine,
    ) -> Self {
        Self {
            repository,
            notifier,
            processor,
            engine,
        }
    }

    pub fn rules(&self) -> &[DiscountRule] {
        self.engine.rules()
    }

    /// Register a customer record; ids must be unique.
    pub fn register_customer(&self, customer: Customer) -> Result<Customer, DiscountServiceError> {
        let stored = self.repository.insert(customer)?;
        info!(customer_id = %stored.id, name = %stored.name, "customer registered");
        Ok(stored)
    }

    /// Submit a purchase stamped with the current time.
    pub fn submit_purchase(
        &self,
        customer_id: &CustomerId,
        amount: MoneyCents,
    ) -> Result<PurchaseReport, DiscountServiceError> {
        self.process_purchase(PurchaseEvent {
            customer_id: customer_id.clone(),
            amount,
            timestamp: Utc::now(),
        })
    }

    /// Apply a purchase, evaluate the rules and notify listeners.
    ///
    /// Unknown customers and rejected amounts leave the store untouched. An evaluation
    /// failure happens after the totals were stored; it is logged and nothing is notified.
    pub fn process_purchase(
        &self,
        event: PurchaseEvent,
    ) -> Result<PurchaseReport, DiscountServiceError> {
        let Some(mut customer) = self.repository.fetch(&event.customer_id)? else {
            warn!(
                customer_id = %event.customer_id,
                amount = event.amount,
                "purchase dropped: customer not found"
            );
            return Err(DiscountServiceError::UnknownCustomer(event.customer_id));
        };

        let facts = match self.processor.apply(&mut customer, &event) {
            Ok(facts) => facts,
            Err(rejected) => {
                warn!(customer_id = %event.customer_id, error = %rejected, "purchase rejected");
                return Err(rejected.into());
            }
        };
        self.repository.update(customer)?;

        let matches = match self.engine.evaluate(&facts) {
            Ok(matches) => matches,
            Err(failure) => {
                error!(
                    customer_id = %facts.customer_id,
                    error = %failure,
                    "rule evaluation failed"
                );
                return Err(DiscountServiceError::EvaluationFailure(failure));
            }
        };

        self.notify(&facts, &matches);

        debug!(
            customer_id = %facts.customer_id,
            total = facts.total_purchases,
            weekly = facts.weekly_purchases,
            matched = matches.len(),
            "purchase processed"
        );

        Ok(PurchaseReport {
            event,
            facts,
            matches,
        })
    }

    fn notify(&self, facts: &FactSet, matches: &[DiscountMatch]) {
        if matches.is_empty() {
            if let Err(failure) = self.notifier.notify_no_match(facts) {
                warn!(
                    customer_id = %facts.customer_id,
                    error = %failure,
                    "no-match notice not delivered"
                );
            }
            return;
        }

        for hit in matches {
            if let Err(failure) = self.notifier.notify_discount(&hit.outcome, &hit.message) {
                warn!(
                    customer_id = %facts.customer_id,
                    discount = hit.outcome.discount_type.label(),
                    error = %failure,
                    "discount notice not delivered"
                );
            }
        }
    }

    pub fn customer(&self, customer_id: &CustomerId) -> Result<Customer, DiscountServiceError> {
        self.repository
            .fetch(customer_id)?
            .ok_or_else(|| DiscountServiceError::UnknownCustomer(customer_id.clone()))
    }

    pub fn customers(&self) -> Result<Vec<Customer>, DiscountServiceError> {
        Ok(self.repository.list()?)
    }
}

/// Everything derived from one processed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReport {
    pub event: PurchaseEvent,
    pub facts: FactSet,
    pub matches: Vec<DiscountMatch>,
}

impl PurchaseReport {
    pub fn outcomes(&self) -> Vec<&DiscountOutcome> {
        self.matches.iter().map(|hit| &hit.outcome).collect()
    }

    pub fn matched_kinds(&self) -> Vec<DiscountKind> {
        self.matches
            .iter()
            .map(|hit| hit.outcome.discount_type)
            .collect()
    }

    pub fn is_unmatched(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Error raised by the discount service.
#[derive(Debug, thiserror::Error)]
pub enum DiscountServiceError {
    #[error("customer {0} is not registered")]
    UnknownCustomer(CustomerId),
    #[error(transparent)]
    InvalidPurchase(#[from] PurchaseError),
    #[error("rule evaluation failed: {0}")]
    EvaluationFailure(#[from] EvaluationError),
    #[error("invalid rule configuration: {0}")]
    InvalidRules(#[source] EvaluationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
