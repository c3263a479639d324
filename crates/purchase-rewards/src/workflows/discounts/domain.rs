use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monetary amounts are tracked in whole cents.
pub type MoneyCents = u64;

/// Identifier wrapper for registered customers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mutable shopper record holding the running purchase totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub total_purchases: MoneyCents,
    pub weekly_purchases: MoneyCents,
    pub current_purchase_amount: MoneyCents,
    pub last_purchase_at: DateTime<Utc>,
}

impl Customer {
    /// A customer with no purchase history; the rolling window is anchored at `registered_at`.
    pub fn new(id: CustomerId, name: impl Into<String>, registered_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            total_purchases: 0,
            weekly_purchases: 0,
            current_purchase_amount: 0,
            last_purchase_at: registered_at,
        }
    }

    pub fn facts(&self) -> FactSet {
        FactSet {
            customer_id: self.id.clone(),
            total_purchases: self.total_purchases,
            weekly_purchases: self.weekly_purchases,
            current_purchase_amount: self.current_purchase_amount,
        }
    }
}

/// A single purchase submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub customer_id: CustomerId,
    pub amount: MoneyCents,
    pub timestamp: DateTime<Utc>,
}

/// Numeric snapshot of a customer taken right after a purchase was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSet {
    pub customer_id: CustomerId,
    pub total_purchases: MoneyCents,
    pub weekly_purchases: MoneyCents,
    pub current_purchase_amount: MoneyCents,
}

impl FactSet {
    pub fn value(&self, fact: Fact) -> MoneyCents {
        match fact {
            Fact::TotalPurchases => self.total_purchases,
            Fact::WeeklyPurchases => self.weekly_purchases,
            Fact::CurrentPurchaseAmount => self.current_purchase_amount,
        }
    }
}

/// Named inputs a rule condition can read from a fact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fact {
    TotalPurchases,
    WeeklyPurchases,
    CurrentPurchaseAmount,
}

impl Fact {
    pub const fn label(self) -> &'static str {
        match self {
            Fact::TotalPurchases => "total_purchases",
            Fact::WeeklyPurchases => "weekly_purchases",
            Fact::CurrentPurchaseAmount => "current_purchase_amount",
        }
    }
}

/// The discount programs a purchase can qualify for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    BigSpender,
    DailyBigPurchase,
    WeeklySpender,
    NoDiscount,
}

impl DiscountKind {
    pub const fn label(self) -> &'static str {
        match self {
            DiscountKind::BigSpender => "big_spender",
            DiscountKind::DailyBigPurchase => "daily_big_purchase",
            DiscountKind::WeeklySpender => "weekly_spender",
            DiscountKind::NoDiscount => "no_discount",
        }
    }
}

/// Discount decision produced when a rule's conditions hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountOutcome {
    pub customer_id: CustomerId,
    pub discount_type: DiscountKind,
    pub discount_percentage: u8,
    pub purchase_amount: MoneyCents,
    pub applied_immediately: bool,
}

/// Formats cents as a dollar amount, e.g. `12345` -> `$123.45`.
pub fn format_cents(amount: MoneyCents) -> String {
    format!("${}.{:02}", amount / 100, amount % 100)
}
