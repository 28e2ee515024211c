use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A landing page published on a subdomain. `form_id` points at the intake
/// form rendered below the hero copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub user_id: String,
    pub subdomain: String,
    pub headline: String,
    pub description: String,
    pub cta_text: String,
    pub form_id: String,
    pub published: bool,
    pub date_created: DateTime<Utc>,
}

/// Create/update payload supplied by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDraft {
    pub subdomain: String,
    pub headline: String,
    pub description: String,
    pub cta_text: String,
    pub form_id: String,
    #[serde(default)]
    pub published: bool,
}
