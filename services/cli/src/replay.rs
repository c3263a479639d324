use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Args;
use purchase_rewards::config::DiscountConfig;
use purchase_rewards::error::AppError;
use purchase_rewards::workflows::discounts::{load_customers, load_purchases, Customer};
use tracing::info;

use crate::infra::{build_service, handle_purchase};

#[derive(Args, Debug)]
pub(crate) struct ReplayArgs {
    /// CSV with `customer_id,amount,timestamp` rows (amount in dollars, RFC 3339 timestamps)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// CSV with `id,name[,registered_at]` rows; without it every purchasing id is registered
    /// at its first purchase
    #[arg(long)]
    pub(crate) customers: Option<PathBuf>,
    /// Emit purchase reports as JSON lines instead of console notices
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_replay(args: ReplayArgs, config: &DiscountConfig) -> Result<(), AppError> {
    let ReplayArgs {
        input,
        customers,
        json,
    } = args;

    let mut purchases = load_purchases(&input)?;
    purchases.sort_by_key(|event| event.timestamp);
    let service = build_service(config, json)?;

    match customers {
        Some(path) => {
            let fallback = purchases
                .first()
                .map(|event| event.timestamp)
                .unwrap_or_else(chrono::Utc::now);
            for customer in load_customers(&path, fallback)? {
                service.register_customer(customer)?;
            }
        }
        None => {
            let mut seen = BTreeSet::new();
            for event in &purchases {
                if seen.insert(event.customer_id.clone()) {
                    service.register_customer(Customer::new(
                        event.customer_id.clone(),
                        event.customer_id.to_string(),
                        event.timestamp,
                    ))?;
                }
            }
        }
    }

    let total = purchases.len();
    let mut accepted = 0;
    for event in purchases {
        if handle_purchase(&service, event, json)? {
            accepted += 1;
        }
    }

    info!(
        input = %input.display(),
        accepted,
        dropped = total - accepted,
        "replay finished"
    );
    if !json {
        println!("{accepted} of {total} purchase(s) processed");
    }
    Ok(())
}
