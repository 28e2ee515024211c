//! Process-local infrastructure: readiness/metrics state shared with the
//! routes, the log-only email transport, and the in-memory storage used by
//! `serve --in-memory` demo deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use civet::accounts::{AuthError, Authenticator, User};
use civet::forms::{FieldType, Form, FormDraft, FormField, FormRepository, FormStep};
use civet::leads::{
    EmailError, EmailRecord, EmailRepository, EmailSender, Lead, LeadFilters, LeadRepository,
    LeadStatus, NewEmail, NewLead, NewNote, Note, NoteRepository, OutboundEmail, ResponseValue,
    RuleOperator, ScoringRule,
};
use civet::pages::{Page, PageDraft, PageRepository};
use civet::repository::RepositoryError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Email transport that only logs. The dashboard records every send in the
/// emails collection, so deployments without a mail provider still keep a
/// complete outbound history.
#[derive(Default, Clone)]
pub(crate) struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        info!(to = %email.to, subject = %email.subject, "outbound email (log-only transport)");
        Ok(())
    }
}

/// Single-token authenticator for demo mode. The token is generated at
/// startup and printed to the log.
pub(crate) struct DevAuthenticator {
    token: String,
    user: User,
}

impl DevAuthenticator {
    pub(crate) fn new(token: String, user: User) -> Self {
        Self { token, user }
    }
}

#[async_trait]
impl Authenticator for DevAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        if token == self.token {
            Ok(self.user.clone())
        } else {
            Err(AuthError::Unauthorized)
        }
    }
}

fn next_id(prefix: &str, sequence: &AtomicU64) -> String {
    format!("{prefix}-{}", sequence.fetch_add(1, Ordering::Relaxed) + 1)
}

#[derive(Default)]
pub(crate) struct InMemoryPageRepository {
    records: Mutex<HashMap<String, Page>>,
    sequence: AtomicU64,
}

#[async_trait]
impl PageRepository for InMemoryPageRepository {
    async fn insert(&self, user_id: &str, draft: PageDraft) -> Result<Page, RepositoryError> {
        let page = Page {
            id: next_id("page", &self.sequence),
            user_id: user_id.to_string(),
            subdomain: draft.subdomain,
            headline: draft.headline,
            description: draft.description,
            cta_text: draft.cta_text,
            form_id: draft.form_id,
            published: draft.published,
            date_created: Utc::now(),
        };
        let mut guard = self.records.lock().expect("page mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.subdomain == page.subdomain)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(page.id.clone(), page.clone());
        Ok(page)
    }

    async fn update(&self, page: Page) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("page mutex poisoned");
        if !guard.contains_key(&page.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(page.id.clone(), page);
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Page>, RepositoryError> {
        let guard = self.records.lock().expect("page mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Page>, RepositoryError> {
        let guard = self.records.lock().expect("page mutex poisoned");
        Ok(guard
            .values()
            .filter(|page| page.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn published_for_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<Page>, RepositoryError> {
        let guard = self.records.lock().expect("page mutex poisoned");
        Ok(guard
            .values()
            .find(|page| page.subdomain == subdomain && page.published)
            .cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryFormRepository {
    records: Mutex<HashMap<String, Form>>,
    sequence: AtomicU64,
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn insert(&self, user_id: &str, draft: FormDraft) -> Result<Form, RepositoryError> {
        let form = Form {
            id: next_id("form", &self.sequence),
            user_id: user_id.to_string(),
            name: draft.name,
            steps: draft.steps,
            scoring_rules: draft.scoring_rules,
            date_created: Utc::now(),
        };
        let mut guard = self.records.lock().expect("form mutex poisoned");
        guard.insert(form.id.clone(), form.clone());
        Ok(form)
    }

    async fn update(&self, form: Form) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("form mutex poisoned");
        if !guard.contains_key(&form.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(form.id.clone(), form);
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Form>, RepositoryError> {
        let guard = self.records.lock().expect("form mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Form>, RepositoryError> {
        let guard = self.records.lock().expect("form mutex poisoned");
        Ok(guard
            .values()
            .filter(|form| form.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryLeadRepository {
    records: Mutex<HashMap<String, Lead>>,
    sequence: AtomicU64,
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn insert(&self, lead: NewLead) -> Result<Lead, RepositoryError> {
        let stored = Lead {
            id: next_id("lead", &self.sequence),
            user_id: lead.user_id,
            page_id: lead.page_id,
            form_id: lead.form_id,
            responses: lead.responses,
            score: lead.score,
            status: lead.status,
            date_created: lead.date_created.unwrap_or_else(Utc::now),
            date_updated: None,
        };
        let mut guard = self.records.lock().expect("lead mutex poisoned");
        guard.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("lead mutex poisoned");
        let lead = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        lead.status = status;
        lead.date_updated = Some(Utc::now());
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Lead>, RepositoryError> {
        let guard = self.records.lock().expect("lead mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filters: &LeadFilters,
    ) -> Result<Vec<Lead>, RepositoryError> {
        let guard = self.records.lock().expect("lead mutex poisoned");
        let mut leads: Vec<Lead> = guard
            .values()
            .filter(|lead| lead.user_id == user_id && filters.matches(lead))
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        Ok(leads)
    }

    async fn unread_count(&self, user_id: &str) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("lead mutex poisoned");
        Ok(guard
            .values()
            .filter(|lead| lead.user_id == user_id && lead.status == LeadStatus::New)
            .count() as u64)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("lead mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryNoteRepository {
    records: Mutex<Vec<Note>>,
    sequence: AtomicU64,
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn insert(&self, note: NewNote) -> Result<Note, RepositoryError> {
        let stored = Note {
            id: next_id("note", &self.sequence),
            lead_id: note.lead_id,
            user_id: note.user_id,
            content: note.content,
            date_created: Utc::now(),
        };
        let mut guard = self.records.lock().expect("note mutex poisoned");
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_lead(&self, lead_id: &str) -> Result<Vec<Note>, RepositoryError> {
        let guard = self.records.lock().expect("note mutex poisoned");
        Ok(guard
            .iter()
            .filter(|note| note.lead_id == lead_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryEmailRepository {
    records: Mutex<Vec<EmailRecord>>,
    sequence: AtomicU64,
}

#[async_trait]
impl EmailRepository for InMemoryEmailRepository {
    async fn insert(&self, email: NewEmail) -> Result<EmailRecord, RepositoryError> {
        let stored = EmailRecord {
            id: next_id("email", &self.sequence),
            lead_id: email.lead_id,
            user_id: email.user_id,
            to: email.to,
            subject: email.subject,
            body: email.body,
            sent_at: email.sent_at,
        };
        let mut guard = self.records.lock().expect("email mutex poisoned");
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_lead(&self, lead_id: &str) -> Result<Vec<EmailRecord>, RepositoryError> {
        let guard = self.records.lock().expect("email mutex poisoned");
        Ok(guard
            .iter()
            .filter(|email| email.lead_id == lead_id)
            .cloned()
            .collect())
    }
}

/// Owner account used by demo mode.
pub(crate) fn demo_user() -> User {
    User {
        id: "demo-user".to_string(),
        email: "demo@civet.local".to_string(),
        name: "Demo".to_string(),
        subdomain: "demo".to_string(),
        date_created: Utc::now(),
    }
}

/// Published landing page plus intake form for the demo owner.
pub(crate) fn demo_page_draft(form_id: &str) -> PageDraft {
    PageDraft {
        subdomain: "demo".to_string(),
        headline: "Demo Consulting".to_string(),
        description: "Tell us about your project and we'll get back within a day.".to_string(),
        cta_text: "Get in touch".to_string(),
        form_id: form_id.to_string(),
        published: true,
    }
}

pub(crate) fn demo_form_draft() -> FormDraft {
    let rule = |field: &str, operator: RuleOperator, value: ResponseValue, points: i64| {
        ScoringRule {
            field: field.to_string(),
            operator,
            value,
            points,
        }
    };

    FormDraft {
        name: "Project Intake".to_string(),
        steps: vec![
            FormStep {
                id: "contact".to_string(),
                title: "Contact".to_string(),
                fields: vec![
                    FormField {
                        id: "name".to_string(),
                        field_type: FieldType::Text,
                        label: "Your name".to_string(),
                        placeholder: None,
                        required: true,
                        options: None,
                    },
                    FormField {
                        id: "email".to_string(),
                        field_type: FieldType::Email,
                        label: "Email".to_string(),
                        placeholder: None,
                        required: true,
                        options: None,
                    },
                ],
            },
            FormStep {
                id: "project".to_string(),
                title: "Project".to_string(),
                fields: vec![
                    FormField {
                        id: "budget".to_string(),
                        field_type: FieldType::Number,
                        label: "Budget (USD)".to_string(),
                        placeholder: Some("5000".to_string()),
                        required: false,
                        options: None,
                    },
                    FormField {
                        id: "message".to_string(),
                        field_type: FieldType::Textarea,
                        label: "What do you need?".to_string(),
                        placeholder: None,
                        required: true,
                        options: None,
                    },
                ],
            },
        ],
        scoring_rules: vec![
            rule(
                "budget",
                RuleOperator::GreaterThan,
                ResponseValue::from(5000.0),
                10,
            ),
            rule(
                "message",
                RuleOperator::Contains,
                ResponseValue::from("urgent"),
                5,
            ),
        ],
    }
}
