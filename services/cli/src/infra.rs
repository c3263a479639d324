use std::sync::Arc;

use purchase_rewards::config::DiscountConfig;
use purchase_rewards::error::AppError;
use purchase_rewards::workflows::discounts::{
    format_cents, render_no_match, render_notice, DiscountNotifier, DiscountOutcome,
    DiscountService, DiscountServiceError, EvaluationEngine, FactSet, InMemoryCustomerRepository,
    NotificationDispatcher, NotifyError, PurchaseEvent, PurchaseReport, TracingNotifier,
};

pub(crate) type CliDiscountService =
    DiscountService<InMemoryCustomerRepository, NotificationDispatcher>;

/// Prints customer-facing notices to stdout as they are dispatched.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ConsoleNotifier;

impl DiscountNotifier for ConsoleNotifier {
    fn notify_discount(&self, outcome: &DiscountOutcome, message: &str) -> Result<(), NotifyError> {
        println!(
            "  [{}] {}",
            outcome.discount_type.label(),
            render_notice(outcome, message)
        );
        Ok(())
    }

    fn notify_no_match(&self, facts: &FactSet) -> Result<(), NotifyError> {
        println!("  [no_match] {}", render_no_match(facts));
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "console"
    }
}

/// Human output renders notices through [`ConsoleNotifier`]; JSON output leaves them to the log.
pub(crate) fn build_service(
    config: &DiscountConfig,
    json: bool,
) -> Result<CliDiscountService, AppError> {
    let mut dispatcher = NotificationDispatcher::new().with_listener(Arc::new(TracingNotifier));
    if !json {
        dispatcher.register(Arc::new(ConsoleNotifier));
    }

    let service = DiscountService::new(
        Arc::new(InMemoryCustomerRepository::default()),
        Arc::new(dispatcher),
        config,
    )?;
    Ok(service)
}

/// Printed before processing so console notices follow their purchase.
fn print_purchase(event: &PurchaseEvent) {
    println!(
        "{} {} spends {}",
        event.timestamp.format("%Y-%m-%d %H:%M"),
        event.customer_id,
        format_cents(event.amount),
    );
}

fn print_totals(report: &PurchaseReport) {
    println!(
        "  lifetime {}, this week {}",
        format_cents(report.facts.total_purchases),
        format_cents(report.facts.weekly_purchases),
    );
}

/// Processes one purchase and prints its outcome. Returns whether the purchase was accepted.
pub(crate) fn handle_purchase(
    service: &CliDiscountService,
    event: PurchaseEvent,
    json: bool,
) -> Result<bool, AppError> {
    if !json {
        print_purchase(&event);
    }

    match service.process_purchase(event) {
        Ok(report) if json => print_report_json(&report).map(|_| true),
        Ok(report) => {
            print_totals(&report);
            Ok(true)
        }
        Err(err @ DiscountServiceError::Repository(_)) => Err(err.into()),
        Err(err) => {
            if !json {
                println!("  dropped: {err}");
            }
            Ok(false)
        }
    }
}

fn print_report_json(report: &PurchaseReport) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(report)?);
    Ok(())
}

pub(crate) fn print_rules(config: &DiscountConfig, json: bool) -> Result<(), AppError> {
    let engine =
        EvaluationEngine::new(&config.evaluation).map_err(DiscountServiceError::InvalidRules)?;

    if json {
        println!("{}", serde_json::to_string_pretty(engine.rules())?);
        return Ok(());
    }

    println!("Weekly window: {} day(s)", config.weekly_window_days);
    for rule in engine.rules() {
        let conditions = rule
            .conditions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND ");
        let timing = if rule.outcome.applied_immediately {
            "applied immediately"
        } else {
            "next purchase"
        };
        println!(
            "{:>2}  {:<20} {} => {}% ({})",
            rule.priority,
            rule.kind.label(),
            conditions,
            rule.outcome.discount_percentage,
            timing
        );
    }
    Ok(())
}
