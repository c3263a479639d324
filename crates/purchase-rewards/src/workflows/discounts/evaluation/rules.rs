use std::fmt;

use serde::Serialize;

use super::super::domain::{
    format_cents, DiscountKind, DiscountOutcome, Fact, FactSet, MoneyCents,
};
use super::config::EvaluationConfig;
use super::DiscountMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    GreaterThan,
    AtLeast,
    LessThan,
    AtMost,
}

impl Comparison {
    fn holds(self, value: MoneyCents, threshold: MoneyCents) -> bool {
        match self {
            Comparison::GreaterThan => value > threshold,
            Comparison::AtLeast => value >= threshold,
            Comparison::LessThan => value < threshold,
            Comparison::AtMost => value <= threshold,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Comparison::GreaterThan => ">",
            Comparison::AtLeast => ">=",
            Comparison::LessThan => "<",
            Comparison::AtMost => "<=",
        }
    }
}

/// One `fact <op> threshold` clause of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub fact: Fact,
    pub comparison: Comparison,
    pub threshold: MoneyCents,
}

impl Condition {
    const fn new(fact: Fact, comparison: Comparison, threshold: MoneyCents) -> Self {
        Self {
            fact,
            comparison,
            threshold,
        }
    }

    pub fn holds(&self, facts: &FactSet) -> bool {
        self.comparison.holds(facts.value(self.fact), self.threshold)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.fact.label(),
            self.comparison.symbol(),
            format_cents(self.threshold)
        )
    }
}

/// What a rule grants once all of its conditions hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub discount_percentage: u8,
    pub applied_immediately: bool,
    pub message: String,
}

/// Static threshold rule; all conditions must hold for it to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountRule {
    pub kind: DiscountKind,
    pub priority: u8,
    pub conditions: Vec<Condition>,
    pub outcome: RuleOutcome,
}

/// Result of checking a single rule against a fact set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    Matched(DiscountMatch),
    NoMatch,
}

impl DiscountRule {
    pub fn check(&self, facts: &FactSet) -> RuleMatch {
        if !self.conditions.iter().all(|condition| condition.holds(facts)) {
            return RuleMatch::NoMatch;
        }

        RuleMatch::Matched(DiscountMatch {
            priority: self.priority,
            outcome: DiscountOutcome {
                customer_id: facts.customer_id.clone(),
                discount_type: self.kind,
                discount_percentage: self.outcome.discount_percentage,
                purchase_amount: facts.current_purchase_amount,
                applied_immediately: self.outcome.applied_immediately,
            },
            message: self.outcome.message.clone(),
        })
    }
}

/// Builds the four reference rules from `config`, highest priority first.
pub(crate) fn build_rules(config: &EvaluationConfig) -> Vec<DiscountRule> {
    vec![
        DiscountRule {
            kind: DiscountKind::BigSpender,
            priority: 4,
            conditions: vec![Condition::new(
                Fact::TotalPurchases,
                Comparison::GreaterThan,
                config.big_spender_threshold,
            )],
            outcome: RuleOutcome {
                discount_percentage: config.big_spender_percentage,
                applied_immediately: false,
                message: config.messages.big_spender.clone(),
            },
        },
        DiscountRule {
            kind: DiscountKind::DailyBigPurchase,
            priority: 3,
            conditions: vec![Condition::new(
                Fact::CurrentPurchaseAmount,
                Comparison::AtLeast,
                config.daily_big_purchase_threshold,
            )],
            outcome: RuleOutcome {
                discount_percentage: config.daily_big_purchase_percentage,
                applied_immediately: true,
                message: config.messages.daily_big_purchase.clone(),
            },
        },
        DiscountRule {
            kind: DiscountKind::WeeklySpender,
            priority: 2,
            conditions: vec![Condition::new(
                Fact::WeeklyPurchases,
                Comparison::AtLeast,
                config.weekly_spender_threshold,
            )],
            outcome: RuleOutcome {
                discount_percentage: config.weekly_spender_percentage,
                applied_immediately: false,
                message: config.messages.weekly_spender.clone(),
            },
        },
        DiscountRule {
            kind: DiscountKind::NoDiscount,
            priority: 1,
            conditions: vec![
                Condition::new(
                    Fact::CurrentPurchaseAmount,
                    Comparison::LessThan,
                    config.no_discount_purchase_ceiling,
                ),
                Condition::new(
                    Fact::TotalPurchases,
                    Comparison::AtMost,
                    config.big_spender_threshold,
                ),
                Condition::new(
                    Fact::WeeklyPurchases,
                    Comparison::LessThan,
                    config.weekly_spender_threshold,
                ),
            ],
            outcome: RuleOutcome {
                discount_percentage: 0,
                applied_immediately: false,
                message: config.messages.no_discount.clone(),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::discounts::domain::CustomerId;

    fn facts(total: MoneyCents, weekly: MoneyCents, current: MoneyCents) -> FactSet {
        FactSet {
            customer_id: CustomerId::new("c-rules"),
            total_purchases: total,
            weekly_purchases: weekly,
            current_purchase_amount: current,
        }
    }

    #[test]
    fn comparisons_respect_boundaries() {
        assert!(Comparison::GreaterThan.holds(501, 500));
        assert!(!Comparison::GreaterThan.holds(500, 500));
        assert!(Comparison::AtLeast.holds(500, 500));
        assert!(!Comparison::LessThan.holds(500, 500));
        assert!(Comparison::AtMost.holds(500, 500));
    }

    #[test]
    fn condition_display_reads_as_dollars() {
        let condition = Condition::new(Fact::TotalPurchases, Comparison::GreaterThan, 50_000);
        assert_eq!(condition.to_string(), "total_purchases > $500.00");
    }

    #[test]
    fn rule_requires_every_condition() {
        let rules = build_rules(&EvaluationConfig::default());
        let no_discount = rules
            .iter()
            .find(|rule| rule.kind == DiscountKind::NoDiscount)
            .expect("no discount rule present");

        assert!(matches!(
            no_discount.check(&facts(5_000, 5_000, 5_000)),
            RuleMatch::Matched(_)
        ));
        assert_eq!(
            no_discount.check(&facts(5_000, 10_000, 5_000)),
            RuleMatch::NoMatch
        );
    }

    #[test]
    fn matched_rule_carries_purchase_amount() {
        let rules = build_rules(&EvaluationConfig::default());
        let daily = &rules[1];

        match daily.check(&facts(30_000, 30_000, 30_000)) {
            RuleMatch::Matched(hit) => {
                assert_eq!(hit.outcome.discount_type, DiscountKind::DailyBigPurchase);
                assert_eq!(hit.outcome.purchase_amount, 30_000);
                assert!(hit.outcome.applied_immediately);
            }
            RuleMatch::NoMatch => panic!("expected daily big purchase match"),
        }
    }
}
