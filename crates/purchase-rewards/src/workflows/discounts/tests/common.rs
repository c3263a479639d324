use std::io;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::config::DiscountConfig;
use crate::workflows::discounts::domain::{Customer, CustomerId, FactSet, MoneyCents};
use crate::workflows::discounts::evaluation::EvaluationEngine;
use crate::workflows::discounts::notifications::{DiscountNotifier, NotifyError};
use crate::workflows::discounts::repository::{
    CustomerRepository, InMemoryCustomerRepository, RepositoryError,
};
use crate::workflows::discounts::{DiscountOutcome, DiscountService, RecordingNotifier};

/// Dollars to cents.
pub(super) const fn usd(dollars: MoneyCents) -> MoneyCents {
    dollars * 100
}

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_after_epoch(days: i64) -> DateTime<Utc> {
    epoch() + Duration::days(days)
}

pub(super) fn customer_id() -> CustomerId {
    CustomerId::new("cust-001")
}

pub(super) fn customer() -> Customer {
    Customer::new(customer_id(), "Jordan Smith", epoch())
}

pub(super) fn facts(total: MoneyCents, weekly: MoneyCents, current: MoneyCents) -> FactSet {
    FactSet {
        customer_id: customer_id(),
        total_purchases: total,
        weekly_purchases: weekly,
        current_purchase_amount: current,
    }
}

pub(super) fn evaluation_engine() -> EvaluationEngine {
    EvaluationEngine::default()
}

pub(super) fn build_service() -> (
    DiscountService<InMemoryCustomerRepository, RecordingNotifier>,
    Arc<InMemoryCustomerRepository>,
    Arc<RecordingNotifier>,
) {
    let repository = Arc::new(InMemoryCustomerRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service =
        DiscountService::new(repository.clone(), notifier.clone(), &DiscountConfig::default())
            .expect("default rules are valid");
    (service, repository, notifier)
}

pub(super) struct FailingNotifier;

impl DiscountNotifier for FailingNotifier {
    fn notify_discount(
        &self,
        _outcome: &DiscountOutcome,
        _message: &str,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("smtp offline".to_string()))
    }

    fn notify_no_match(&self, _facts: &FactSet) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("smtp offline".to_string()))
    }

    fn channel_name(&self) -> &str {
        "failing"
    }
}

pub(super) struct UnavailableRepository;

impl CustomerRepository for UnavailableRepository {
    fn insert(&self, _customer: Customer) -> Result<Customer, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn update(&self, _customer: Customer) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

/// Log sink shared between a scoped subscriber and the assertions.
#[derive(Clone, Default)]
pub(super) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(super) fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().expect("log buffer poisoned").clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with WARN-and-above events captured.
pub(super) fn with_captured_warnings<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}
