use chrono::{Duration, Utc};
use clap::Args;
use purchase_rewards::config::DiscountConfig;
use purchase_rewards::error::AppError;
use purchase_rewards::workflows::discounts::{Customer, CustomerId, MoneyCents, PurchaseEvent};
use tracing::info;

use crate::infra::{build_service, handle_purchase};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Display name of the demo customer
    #[arg(long, default_value = "Jordan Smith")]
    pub(crate) customer_name: String,
    /// Emit purchase reports as JSON lines instead of console notices
    #[arg(long)]
    pub(crate) json: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            customer_name: "Jordan Smith".to_string(),
            json: false,
        }
    }
}

/// Offset from the demo start and amount in cents. The last purchase lands after the
/// weekly window has lapsed.
fn demo_purchases() -> [(Duration, MoneyCents); 4] {
    [
        (Duration::hours(1), 5_000),
        (Duration::days(1), 15_000),
        (Duration::days(2), 40_000),
        (Duration::days(10), 8_000),
    ]
}

pub(crate) fn run_demo(args: DemoArgs, config: &DiscountConfig) -> Result<(), AppError> {
    let service = build_service(config, args.json)?;
    let start = Utc::now() - Duration::days(14);
    let customer_id = CustomerId::new("cust-001");

    service.register_customer(Customer::new(
        customer_id.clone(),
        args.customer_name,
        start,
    ))?;
    info!(%customer_id, "running discount demo");

    for (offset, amount) in demo_purchases() {
        handle_purchase(
            &service,
            PurchaseEvent {
                customer_id: customer_id.clone(),
                amount,
                timestamp: start + offset,
            },
            args.json,
        )?;
    }

    handle_purchase(
        &service,
        PurchaseEvent {
            customer_id: CustomerId::new("cust-unknown"),
            amount: 2_500,
            timestamp: start + Duration::days(11),
        },
        args.json,
    )?;

    Ok(())
}
