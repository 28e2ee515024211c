//! Lead scoring: evaluates a form's rule set against a submitted response map.
//!
//! Scoring runs inline on the public submission path, so every edge case
//! (missing field, type mismatch, unknown operator) degrades to "no points"
//! rather than an error. A lead is always created with some score.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One scalar captured by an intake form. Untagged so raw JSON submissions
/// deserialize directly: `true` -> Bool, `9` -> Number, `"9"` -> Text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ResponseValue {
    fn as_text(&self) -> Cow<'_, str> {
        match self {
            ResponseValue::Text(value) => Cow::Borrowed(value),
            ResponseValue::Number(value) => Cow::Owned(value.to_string()),
            ResponseValue::Bool(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            ResponseValue::Number(value) => Some(*value),
            ResponseValue::Text(value) => value.trim().parse::<f64>().ok(),
            ResponseValue::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
        }
    }
}

impl From<&str> for ResponseValue {
    fn from(value: &str) -> Self {
        ResponseValue::Text(value.to_string())
    }
}

impl From<f64> for ResponseValue {
    fn from(value: f64) -> Self {
        ResponseValue::Number(value)
    }
}

impl From<bool> for ResponseValue {
    fn from(value: bool) -> Self {
        ResponseValue::Bool(value)
    }
}

/// Submitted responses keyed by field identifier. Skipped optional fields are
/// simply missing keys.
pub type FormResponses = BTreeMap<String, ResponseValue>;

/// Comparison applied by a scoring rule. Rule sets are authored through a UI
/// builder and stored as data, so an operator this build does not recognize
/// still deserializes (as `Unknown`) and scores nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
    #[serde(other, skip_serializing)]
    Unknown,
}

/// A single field/operator/value/points tuple. Rules are independent; every
/// matching rule contributes its points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub field: String,
    pub operator: RuleOperator,
    pub value: ResponseValue,
    pub points: i64,
}

/// Compute the score for one submission. Pure and deterministic: no I/O, no
/// shared state, identical inputs always yield the identical sum.
pub fn score(responses: &FormResponses, rules: &[ScoringRule]) -> i64 {
    let mut total = 0;

    for rule in rules {
        let Some(value) = responses.get(&rule.field) else {
            continue;
        };

        if rule_matches(value, rule) {
            total += rule.points;
        }
    }

    total
}

fn rule_matches(value: &ResponseValue, rule: &ScoringRule) -> bool {
    match rule.operator {
        // Strict, type-sensitive equality. "9" never equals 9.
        RuleOperator::Equals => *value == rule.value,
        RuleOperator::Contains => value
            .as_text()
            .to_lowercase()
            .contains(&rule.value.as_text().to_lowercase()),
        RuleOperator::GreaterThan => numeric_pair(value, &rule.value)
            .map(|(lhs, rhs)| lhs > rhs)
            .unwrap_or(false),
        RuleOperator::LessThan => numeric_pair(value, &rule.value)
            .map(|(lhs, rhs)| lhs < rhs)
            .unwrap_or(false),
        RuleOperator::Unknown => false,
    }
}

fn numeric_pair(value: &ResponseValue, rule_value: &ResponseValue) -> Option<(f64, f64)> {
    Some((value.as_number()?, rule_value.as_number()?))
}
