mod config;
mod rules;

pub use config::{EvaluationConfig, NoticeMessages};
pub use rules::{Comparison, Condition, DiscountRule, RuleMatch, RuleOutcome};

use serde::{Deserialize, Serialize};

use super::domain::{CustomerId, DiscountOutcome, FactSet};

/// Evaluates fact sets against a fixed, priority-ordered rule set.
///
/// Every rule is checked independently; priority only orders the returned matches.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    rules: Vec<DiscountRule>,
}

impl Default for EvaluationEngine {
    fn default() -> Self {
        Self {
            rules: rules::build_rules(&EvaluationConfig::default()),
        }
    }
}

impl EvaluationEngine {
    pub fn new(config: &EvaluationConfig) -> Result<Self, EvaluationError> {
        Self::from_rules(rules::build_rules(config))
    }

    pub fn from_rules(mut rules: Vec<DiscountRule>) -> Result<Self, EvaluationError> {
        if rules.is_empty() {
            return Err(EvaluationError::EmptyRuleSet);
        }
        for rule in &rules {
            if rule.conditions.is_empty() {
                return Err(EvaluationError::InvalidRule {
                    rule: rule.kind.label(),
                    reason: "at least one condition is required".to_string(),
                });
            }
            if rule.outcome.discount_percentage > 100 {
                return Err(EvaluationError::InvalidRule {
                    rule: rule.kind.label(),
                    reason: format!(
                        "discount of {}% exceeds 100%",
                        rule.outcome.discount_percentage
                    ),
                });
            }
        }
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[DiscountRule] {
        &self.rules
    }

    pub fn evaluate(&self, facts: &FactSet) -> Result<Vec<DiscountMatch>, EvaluationError> {
        check_consistency(facts)?;

        Ok(self
            .rules
            .iter()
            .filter_map(|rule| match rule.check(facts) {
                RuleMatch::Matched(hit) => Some(hit),
                RuleMatch::NoMatch => None,
            })
            .collect())
    }
}

/// Running totals are cumulative, so a snapshot must satisfy `current <= weekly <= total`.
fn check_consistency(facts: &FactSet) -> Result<(), EvaluationError> {
    if facts.weekly_purchases > facts.total_purchases {
        return Err(EvaluationError::InconsistentFacts {
            customer_id: facts.customer_id.clone(),
            reason: format!(
                "weekly purchases {} exceed total purchases {}",
                facts.weekly_purchases, facts.total_purchases
            ),
        });
    }
    if facts.current_purchase_amount > facts.weekly_purchases {
        return Err(EvaluationError::InconsistentFacts {
            customer_id: facts.customer_id.clone(),
            reason: format!(
                "current purchase {} exceeds weekly purchases {}",
                facts.current_purchase_amount, facts.weekly_purchases
            ),
        });
    }
    Ok(())
}

/// A rule hit: the outcome plus the notice text configured for the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountMatch {
    pub priority: u8,
    pub outcome: DiscountOutcome,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("rule set contains no rules")]
    EmptyRuleSet,
    #[error("rule {rule} is invalid: {reason}")]
    InvalidRule { rule: &'static str, reason: String },
    #[error("inconsistent facts for customer {customer_id}: {reason}")]
    InconsistentFacts {
        customer_id: CustomerId,
        reason: String,
    },
}
