use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::leads::scoring::ScoringRule;

/// Input widget rendered for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Select,
    Textarea,
    Number,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// One step of the multi-step intake wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormStep {
    pub id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

/// A form definition: the wizard steps plus the scoring rule set evaluated
/// against each submission. Rule order is preserved as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub steps: Vec<FormStep>,
    #[serde(default)]
    pub scoring_rules: Vec<ScoringRule>,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    pub name: String,
    pub steps: Vec<FormStep>,
    #[serde(default)]
    pub scoring_rules: Vec<ScoringRule>,
}
