use serde::{Deserialize, Serialize};

use super::super::domain::MoneyCents;

/// Thresholds, percentages and notice copy for the discount rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Lifetime spend that must be exceeded to qualify as a big spender.
    pub big_spender_threshold: MoneyCents,
    pub big_spender_percentage: u8,
    /// Single purchase amount that triggers the immediate discount.
    pub daily_big_purchase_threshold: MoneyCents,
    pub daily_big_purchase_percentage: u8,
    /// Rolling weekly spend that triggers the weekly discount.
    pub weekly_spender_threshold: MoneyCents,
    pub weekly_spender_percentage: u8,
    /// Purchases below this amount are eligible for the informational notice.
    pub no_discount_purchase_ceiling: MoneyCents,
    pub messages: NoticeMessages,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            big_spender_threshold: 50_000,
            big_spender_percentage: 20,
            daily_big_purchase_threshold: 20_000,
            daily_big_purchase_percentage: 10,
            weekly_spender_threshold: 10_000,
            weekly_spender_percentage: 5,
            no_discount_purchase_ceiling: 10_000,
            messages: NoticeMessages::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeMessages {
    pub big_spender: String,
    pub daily_big_purchase: String,
    pub weekly_spender: String,
    pub no_discount: String,
}

impl Default for NoticeMessages {
    fn default() -> Self {
        Self {
            big_spender: "Thank you for being one of our best customers!".to_string(),
            daily_big_purchase: "Big basket today, the discount is already applied.".to_string(),
            weekly_spender: "You have been shopping with us all week.".to_string(),
            no_discount: "Keep shopping to unlock discounts.".to_string(),
        }
    }
}
