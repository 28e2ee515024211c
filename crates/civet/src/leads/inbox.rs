//! Inbox presentation helpers: tab partitioning, message previews, and
//! human-readable timestamps for the lead dashboard.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Lead, LeadStatus};
use super::scoring::{FormResponses, ResponseValue};

const PREVIEW_LIMIT: usize = 60;

/// Fields checked, in order, when deriving a message preview.
const PREVIEW_FIELDS: [&str; 4] = ["message", "comments", "inquiry", "details"];

/// Dashboard inbox tabs. `Unread` and `Archived` are projections of the lead
/// status, not statuses of their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxTab {
    #[default]
    All,
    Unread,
    Archived,
}

impl InboxTab {
    pub const fn label(self) -> &'static str {
        match self {
            InboxTab::All => "All",
            InboxTab::Unread => "Unread",
            InboxTab::Archived => "Archived",
        }
    }

    pub fn includes(self, status: LeadStatus) -> bool {
        match self {
            InboxTab::All => true,
            InboxTab::Unread => status.is_unread(),
            InboxTab::Archived => status.is_archived(),
        }
    }
}

/// Per-tab message counts shown next to the tab labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    pub all: usize,
    pub unread: usize,
    pub archived: usize,
}

pub fn tab_counts(leads: &[Lead]) -> TabCounts {
    TabCounts {
        all: leads.len(),
        unread: leads.iter().filter(|l| l.status.is_unread()).count(),
        archived: leads.iter().filter(|l| l.status.is_archived()).count(),
    }
}

pub fn filter_by_tab(leads: &[Lead], tab: InboxTab) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| tab.includes(lead.status))
        .cloned()
        .collect()
}

/// The assembled inbox payload for one tab.
#[derive(Debug, Clone, Serialize)]
pub struct InboxView {
    pub tab: InboxTab,
    pub counts: TabCounts,
    pub entries: Vec<InboxEntryView>,
}

/// One row of the inbox list. Read/unread and archived are surfaced as
/// independent booleans so clients never re-derive them from the status.
#[derive(Debug, Clone, Serialize)]
pub struct InboxEntryView {
    pub id: String,
    pub contact_name: String,
    pub contact_email: String,
    pub preview: String,
    pub page_headline: String,
    pub status: &'static str,
    pub score: i64,
    pub unread: bool,
    pub archived: bool,
    pub received_at: DateTime<Utc>,
    pub received_relative: String,
}

pub fn entry_view(
    lead: &Lead,
    page_headlines: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> InboxEntryView {
    InboxEntryView {
        id: lead.id.clone(),
        contact_name: text_field(&lead.responses, "name").unwrap_or_else(|| "Anonymous".to_string()),
        contact_email: text_field(&lead.responses, "email")
            .unwrap_or_else(|| "No email".to_string()),
        preview: message_preview(&lead.responses),
        page_headline: page_headlines
            .get(&lead.page_id)
            .cloned()
            .unwrap_or_else(|| "Unknown Page".to_string()),
        status: lead.status.label(),
        score: lead.score,
        unread: lead.status.is_unread(),
        archived: lead.status.is_archived(),
        received_at: lead.date_created,
        received_relative: relative_time(lead.date_created, now),
    }
}

/// Derive a short preview from the submitted responses: a well-known message
/// field if present, otherwise the first non-empty text value.
pub fn message_preview(responses: &FormResponses) -> String {
    let named = PREVIEW_FIELDS
        .iter()
        .find_map(|field| text_field(responses, field));

    let message = named.or_else(|| {
        responses.values().find_map(|value| match value {
            ResponseValue::Text(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        })
    });

    match message {
        Some(text) => truncate(&text, PREVIEW_LIMIT),
        None => "No message".to_string(),
    }
}

fn text_field(responses: &FormResponses, field: &str) -> Option<String> {
    match responses.get(field) {
        Some(ResponseValue::Text(text)) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{cut}...")
}

/// Compact relative timestamp, e.g. "2 min ago", "Yesterday", "Jan 5".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else if then.year() == now.year() {
        then.format("%b %-d").to_string()
    } else {
        then.format("%b %-d, %Y").to_string()
    }
}

/// Long-form timestamp for the detail pane, e.g. "January 8, 2025 at 2:30 PM".
pub fn long_timestamp(then: DateTime<Utc>) -> String {
    then.format("%B %-d, %Y at %-I:%M %p").to_string()
}
