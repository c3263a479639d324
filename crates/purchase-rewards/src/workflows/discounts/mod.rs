//! Purchase-to-discount pipeline: customer store, purchase processing, rule evaluation and
//! notification dispatch.

pub mod domain;
pub mod evaluation;
pub mod notifications;
pub mod processor;
pub mod replay;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    format_cents, Customer, CustomerId, DiscountKind, DiscountOutcome, Fact, FactSet,
    MoneyCents, PurchaseEvent,
};
pub use evaluation::{
    Comparison, Condition, DiscountMatch, DiscountRule, EvaluationConfig, EvaluationEngine,
    EvaluationError, NoticeMessages, RuleMatch, RuleOutcome,
};
pub use notifications::{
    render_no_match, render_notice, DiscountNotifier, Notice, NotificationDispatcher,
    NotifyError, RecordingNotifier, TracingNotifier,
};
pub use processor::{PurchaseError, PurchaseProcessor};
pub use replay::{load_customers, load_purchases, parse_customers, parse_purchases, ReplayError};
pub use repository::{CustomerRepository, InMemoryCustomerRepository, RepositoryError};
pub use service::{DiscountService, DiscountServiceError, PurchaseReport};
