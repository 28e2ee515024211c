use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::accounts::domain::User;
use crate::accounts::service::{AuthError, Authenticator};
use crate::config::SessionConfig;
use crate::forms::domain::{Form, FormDraft, FormStep};
use crate::forms::repository::FormRepository;
use crate::leads::domain::{
    EmailRecord, Lead, LeadFilters, LeadStatus, NewEmail, NewLead, NewNote, Note,
};
use crate::leads::repository::{
    EmailError, EmailRepository, EmailSender, LeadRepository, NoteRepository, OutboundEmail,
};
use crate::leads::scoring::{FormResponses, ResponseValue, RuleOperator, ScoringRule};
use crate::leads::service::{LeadInboxService, LeadIntakeService};
use crate::pages::domain::{Page, PageDraft};
use crate::pages::repository::PageRepository;
use crate::repository::RepositoryError;

pub(super) const OWNER_ID: &str = "user-1";
pub(super) const OWNER_TOKEN: &str = "tok-owner";
pub(super) const SUBDOMAIN: &str = "smith-legal";

pub(super) fn owner() -> User {
    User {
        id: OWNER_ID.to_string(),
        email: "dana@smith.legal".to_string(),
        name: "Dana".to_string(),
        subdomain: SUBDOMAIN.to_string(),
        date_created: Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap(),
    }
}

pub(super) fn session() -> SessionConfig {
    SessionConfig {
        cookie_name: "civet_session".to_string(),
        cookie_secure: false,
        max_age_seconds: 604800,
    }
}

pub(super) fn intake_rules() -> Vec<ScoringRule> {
    vec![
        ScoringRule {
            field: "case_type".to_string(),
            operator: RuleOperator::Equals,
            value: ResponseValue::from("Personal Injury"),
            points: 10,
        },
        ScoringRule {
            field: "description".to_string(),
            operator: RuleOperator::Contains,
            value: ResponseValue::from("injur"),
            points: 5,
        },
        ScoringRule {
            field: "budget".to_string(),
            operator: RuleOperator::GreaterThan,
            value: ResponseValue::from(5000.0),
            points: 5,
        },
    ]
}

pub(super) fn form_draft() -> FormDraft {
    FormDraft {
        name: "Intake".to_string(),
        steps: vec![FormStep {
            id: "step-1".to_string(),
            title: "About your case".to_string(),
            fields: Vec::new(),
        }],
        scoring_rules: intake_rules(),
    }
}

pub(super) fn page_draft(form_id: &str) -> PageDraft {
    PageDraft {
        subdomain: SUBDOMAIN.to_string(),
        headline: "Smith Legal".to_string(),
        description: "Injury law, handled personally.".to_string(),
        cta_text: "Get a free consult".to_string(),
        form_id: form_id.to_string(),
        published: true,
    }
}

pub(super) fn responses(pairs: &[(&str, ResponseValue)]) -> FormResponses {
    pairs
        .iter()
        .map(|(field, value)| (field.to_string(), value.clone()))
        .collect()
}

pub(super) fn text(value: &str) -> ResponseValue {
    ResponseValue::from(value)
}

#[derive(Default)]
pub(super) struct MemoryPages {
    records: Mutex<HashMap<String, Page>>,
    sequence: AtomicU64,
}

impl MemoryPages {
    fn next_id(&self) -> String {
        format!("page-{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl PageRepository for MemoryPages {
    async fn insert(&self, user_id: &str, draft: PageDraft) -> Result<Page, RepositoryError> {
        let page = Page {
            id: self.next_id(),
            user_id: user_id.to_string(),
            subdomain: draft.subdomain,
            headline: draft.headline,
            description: draft.description,
            cta_text: draft.cta_text,
            form_id: draft.form_id,
            published: draft.published,
            date_created: Utc::now(),
        };
        let mut guard = self.records.lock().expect("pages mutex poisoned");
        guard.insert(page.id.clone(), page.clone());
        Ok(page)
    }

    async fn update(&self, page: Page) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("pages mutex poisoned");
        if !guard.contains_key(&page.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(page.id.clone(), page);
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Page>, RepositoryError> {
        let guard = self.records.lock().expect("pages mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Page>, RepositoryError> {
        let guard = self.records.lock().expect("pages mutex poisoned");
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
        let guard = self.records.lock().expect("pages mutex poisoned");
        Ok(guard
            .values()
            .find(|page| page.subdomain == subdomain && page.published)
            .cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryForms {
    records: Mutex<HashMap<String, Form>>,
    sequence: AtomicU64,
}

#[async_trait]
impl FormRepository for MemoryForms {
    async fn insert(&self, user_id: &str, draft: FormDraft) -> Result<Form, RepositoryError> {
        let id = format!("form-{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let form = Form {
            id,
            user_id: user_id.to_string(),
            name: draft.name,
            steps: draft.steps,
            scoring_rules: draft.scoring_rules,
            date_created: Utc::now(),
        };
        let mut guard = self.records.lock().expect("forms mutex poisoned");
        guard.insert(form.id.clone(), form.clone());
        Ok(form)
    }

    async fn update(&self, form: Form) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("forms mutex poisoned");
        if !guard.contains_key(&form.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(form.id.clone(), form);
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Form>, RepositoryError> {
        let guard = self.records.lock().expect("forms mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Form>, RepositoryError> {
        let guard = self.records.lock().expect("forms mutex poisoned");
        Ok(guard
            .values()
            .filter(|form| form.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryLeads {
    records: Mutex<HashMap<String, Lead>>,
    sequence: AtomicU64,
}

#[async_trait]
impl LeadRepository for MemoryLeads {
    async fn insert(&self, lead: NewLead) -> Result<Lead, RepositoryError> {
        let id = format!("lead-{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let stored = Lead {
            id,
            user_id: lead.user_id,
            page_id: lead.page_id,
            form_id: lead.form_id,
            responses: lead.responses,
            score: lead.score,
            status: lead.status,
            date_created: lead.date_created.unwrap_or_else(Utc::now),
            date_updated: None,
        };
        let mut guard = self.records.lock().expect("leads mutex poisoned");
        guard.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("leads mutex poisoned");
        let lead = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        lead.status = status;
        lead.date_updated = Some(Utc::now());
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Lead>, RepositoryError> {
        let guard = self.records.lock().expect("leads mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filters: &LeadFilters,
    ) -> Result<Vec<Lead>, RepositoryError> {
        let guard = self.records.lock().expect("leads mutex poisoned");
        let mut leads: Vec<Lead> = guard
            .values()
            .filter(|lead| lead.user_id == user_id && filters.matches(lead))
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        Ok(leads)
    }

    async fn unread_count(&self, user_id: &str) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("leads mutex poisoned");
        Ok(guard
            .values()
            .filter(|lead| lead.user_id == user_id && lead.status == LeadStatus::New)
            .count() as u64)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("leads mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(super) struct MemoryNotes {
    records: Mutex<Vec<Note>>,
    sequence: AtomicU64,
}

#[async_trait]
impl NoteRepository for MemoryNotes {
    async fn insert(&self, note: NewNote) -> Result<Note, RepositoryError> {
        let stored = Note {
            id: format!("note-{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1),
            lead_id: note.lead_id,
            user_id: note.user_id,
            content: note.content,
            date_created: Utc::now(),
        };
        let mut guard = self.records.lock().expect("notes mutex poisoned");
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_lead(&self, lead_id: &str) -> Result<Vec<Note>, RepositoryError> {
        let guard = self.records.lock().expect("notes mutex poisoned");
        Ok(guard
            .iter()
            .filter(|note| note.lead_id == lead_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryEmails {
    records: Mutex<Vec<EmailRecord>>,
    sequence: AtomicU64,
}

#[async_trait]
impl EmailRepository for MemoryEmails {
    async fn insert(&self, email: NewEmail) -> Result<EmailRecord, RepositoryError> {
        let stored = EmailRecord {
            id: format!("email-{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1),
            lead_id: email.lead_id,
            user_id: email.user_id,
            to: email.to,
            subject: email.subject,
            body: email.body,
            sent_at: email.sent_at,
        };
        let mut guard = self.records.lock().expect("emails mutex poisoned");
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_lead(&self, lead_id: &str) -> Result<Vec<EmailRecord>, RepositoryError> {
        let guard = self.records.lock().expect("emails mutex poisoned");
        Ok(guard
            .iter()
            .filter(|email| email.lead_id == lead_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingSender {
    pub(super) sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        let mut guard = self.sent.lock().expect("sender mutex poisoned");
        guard.push(email.clone());
        Ok(())
    }
}

pub(super) struct FailingSender;

#[async_trait]
impl EmailSender for FailingSender {
    async fn send(&self, _email: &OutboundEmail) -> Result<(), EmailError> {
        Err(EmailError::Transport("smtp unreachable".to_string()))
    }
}

/// Token-to-user table standing in for the Directus session lookup.
#[derive(Default)]
pub(super) struct StaticAuthenticator {
    users: HashMap<String, User>,
}

impl StaticAuthenticator {
    pub(super) fn with_owner() -> Self {
        let mut users = HashMap::new();
        users.insert(OWNER_TOKEN.to_string(), owner());
        Self { users }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        self.users
            .get(token)
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}

pub(super) struct Harness {
    pub(super) pages: Arc<MemoryPages>,
    pub(super) leads: Arc<MemoryLeads>,
    pub(super) notes: Arc<MemoryNotes>,
    pub(super) emails: Arc<MemoryEmails>,
    pub(super) sender: RecordingSender,
    pub(super) intake: Arc<LeadIntakeService>,
    pub(super) inbox: Arc<LeadInboxService>,
}

/// Wire the full lead pipeline over in-memory storage with one published
/// page and its intake form already in place.
pub(super) async fn harness() -> Harness {
    let pages = Arc::new(MemoryPages::default());
    let forms = Arc::new(MemoryForms::default());
    let leads = Arc::new(MemoryLeads::default());
    let notes = Arc::new(MemoryNotes::default());
    let emails = Arc::new(MemoryEmails::default());
    let sender = RecordingSender::default();

    let form = forms
        .insert(OWNER_ID, form_draft())
        .await
        .expect("form inserts");
    pages
        .insert(OWNER_ID, page_draft(&form.id))
        .await
        .expect("page inserts");

    let intake = Arc::new(LeadIntakeService::new(
        pages.clone(),
        forms.clone(),
        leads.clone(),
    ));
    let inbox = Arc::new(LeadInboxService::new(
        leads.clone(),
        notes.clone(),
        emails.clone(),
        Arc::new(sender.clone()),
        pages.clone(),
    ));

    Harness {
        pages,
        leads,
        notes,
        emails,
        sender,
        intake,
        inbox,
    }
}
