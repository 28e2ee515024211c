use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::FormResponses;

/// Lifecycle of a lead as the owner works it. The inbox additionally reads
/// `new` as unread and `closed` as archived; that overloading stays in the
/// view layer (`InboxEntryView` carries two independent booleans).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Closed,
}

impl LeadStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "qualified" => Some(LeadStatus::Qualified),
            "closed" => Some(LeadStatus::Closed),
            _ => None,
        }
    }

    pub const fn is_unread(self) -> bool {
        matches!(self, LeadStatus::New)
    }

    pub const fn is_archived(self) -> bool {
        matches!(self, LeadStatus::Closed)
    }
}

/// One form submission: responses, computed score, and lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub user_id: String,
    pub page_id: String,
    pub form_id: String,
    pub responses: FormResponses,
    pub score: i64,
    pub status: LeadStatus,
    pub date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<DateTime<Utc>>,
}

/// Insert payload; the repository assigns the id and, unless a backdated
/// timestamp is supplied (seed tooling), the creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
    pub user_id: String,
    pub page_id: String,
    pub form_id: String,
    pub responses: FormResponses,
    pub score: i64,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
}

/// Dashboard list filters; all criteria are conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeadFilters {
    pub status: Option<LeadStatus>,
    pub min_score: Option<i64>,
    pub max_score: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl LeadFilters {
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(status) = self.status {
            if lead.status != status {
                return false;
            }
        }
        if let Some(min) = self.min_score {
            if lead.score < min {
                return false;
            }
        }
        if let Some(max) = self.max_score {
            if lead.score > max {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if lead.date_created < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if lead.date_created > end {
                return false;
            }
        }
        true
    }
}

/// Free-form note an owner attaches to a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub lead_id: String,
    pub user_id: String,
    pub content: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNote {
    pub lead_id: String,
    pub user_id: String,
    pub content: String,
}

/// Record of an email sent to a lead from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: String,
    pub lead_id: String,
    pub user_id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmail {
    pub lead_id: String,
    pub user_id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}
