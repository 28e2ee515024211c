use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::forms::repository::FormRepository;
use crate::pages::repository::PageRepository;
use crate::repository::RepositoryError;

use super::domain::{
    EmailRecord, Lead, LeadFilters, LeadStatus, NewEmail, NewLead, NewNote, Note,
};
use super::inbox::{self, InboxTab, InboxView};
use super::repository::{EmailError, EmailRepository, EmailSender, LeadRepository, NoteRepository};
use super::scoring::{self, FormResponses};

/// Public submission path: resolve the site, score the responses against the
/// form's rule set, create the lead. Scoring can never fail, so a visitor
/// always gets a lead created if the site resolves.
pub struct LeadIntakeService {
    pages: Arc<dyn PageRepository>,
    forms: Arc<dyn FormRepository>,
    leads: Arc<dyn LeadRepository>,
}

impl LeadIntakeService {
    pub fn new(
        pages: Arc<dyn PageRepository>,
        forms: Arc<dyn FormRepository>,
        leads: Arc<dyn LeadRepository>,
    ) -> Self {
        Self {
            pages,
            forms,
            leads,
        }
    }

    pub async fn submit(
        &self,
        subdomain: &str,
        responses: FormResponses,
    ) -> Result<Lead, IntakeError> {
        let page = self
            .pages
            .published_for_subdomain(subdomain)
            .await?
            .ok_or(IntakeError::UnknownSite)?;

        let form = self
            .forms
            .fetch(&page.form_id)
            .await?
            .ok_or(IntakeError::FormMissing)?;

        let score = scoring::score(&responses, &form.scoring_rules);

        let lead = self
            .leads
            .insert(NewLead {
                user_id: page.user_id.clone(),
                page_id: page.id.clone(),
                form_id: form.id.clone(),
                responses,
                score,
                status: LeadStatus::New,
                date_created: None,
            })
            .await?;

        info!(lead_id = %lead.id, subdomain, "lead created");
        Ok(lead)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("no published page for this subdomain")]
    UnknownSite,
    #[error("page references a missing form")]
    FormMissing,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Email composition payload from the lead detail pane.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Dashboard path: listing, status transitions, notes, and outbound email for
/// an owner's leads. Every operation is scoped to the calling user; leads
/// belonging to someone else read as not-found.
pub struct LeadInboxService {
    leads: Arc<dyn LeadRepository>,
    notes: Arc<dyn NoteRepository>,
    emails: Arc<dyn EmailRepository>,
    sender: Arc<dyn EmailSender>,
    pages: Arc<dyn PageRepository>,
}

impl LeadInboxService {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        notes: Arc<dyn NoteRepository>,
        emails: Arc<dyn EmailRepository>,
        sender: Arc<dyn EmailSender>,
        pages: Arc<dyn PageRepository>,
    ) -> Self {
        Self {
            leads,
            notes,
            emails,
            sender,
            pages,
        }
    }

    /// Assemble the tabbed inbox view: tab counts over the full mailbox plus
    /// rendered entries for the requested tab.
    pub async fn inbox(&self, user_id: &str, tab: InboxTab) -> Result<InboxView, InboxError> {
        let leads = self
            .leads
            .list_for_user(user_id, &LeadFilters::default())
            .await?;

        let headlines: HashMap<String, String> = self
            .pages
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|page| (page.id, page.headline))
            .collect();

        let counts = inbox::tab_counts(&leads);
        let now = Utc::now();
        let entries = inbox::filter_by_tab(&leads, tab)
            .iter()
            .map(|lead| inbox::entry_view(lead, &headlines, now))
            .collect();

        Ok(InboxView {
            tab,
            counts,
            entries,
        })
    }

    pub async fn list(
        &self,
        user_id: &str,
        filters: &LeadFilters,
    ) -> Result<Vec<Lead>, InboxError> {
        Ok(self.leads.list_for_user(user_id, filters).await?)
    }

    pub async fn get(&self, user_id: &str, lead_id: &str) -> Result<Lead, InboxError> {
        self.owned_lead(user_id, lead_id).await
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<u64, InboxError> {
        Ok(self.leads.unread_count(user_id).await?)
    }

    /// Opening an unread message moves it to `contacted`.
    pub async fn mark_read(&self, user_id: &str, lead_id: &str) -> Result<Lead, InboxError> {
        let lead = self.owned_lead(user_id, lead_id).await?;
        if lead.status != LeadStatus::New {
            return Ok(lead);
        }
        self.transition(lead, LeadStatus::Contacted).await
    }

    pub async fn mark_unread(&self, user_id: &str, lead_id: &str) -> Result<Lead, InboxError> {
        let lead = self.owned_lead(user_id, lead_id).await?;
        self.transition(lead, LeadStatus::New).await
    }

    pub async fn set_status(
        &self,
        user_id: &str,
        lead_id: &str,
        status: LeadStatus,
    ) -> Result<Lead, InboxError> {
        let lead = self.owned_lead(user_id, lead_id).await?;
        self.transition(lead, status).await
    }

    pub async fn add_note(
        &self,
        user_id: &str,
        lead_id: &str,
        content: &str,
    ) -> Result<Note, InboxError> {
        if content.trim().is_empty() {
            return Err(InboxError::EmptyNote);
        }
        let lead = self.owned_lead(user_id, lead_id).await?;

        let note = self
            .notes
            .insert(NewNote {
                lead_id: lead.id,
                user_id: user_id.to_string(),
                content: content.trim().to_string(),
            })
            .await?;
        Ok(note)
    }

    pub async fn notes(&self, user_id: &str, lead_id: &str) -> Result<Vec<Note>, InboxError> {
        let lead = self.owned_lead(user_id, lead_id).await?;
        Ok(self.notes.list_for_lead(&lead.id).await?)
    }

    /// Dispatch an email to the lead and log it. The record is written only
    /// after the transport accepts the message.
    pub async fn send_email(
        &self,
        user_id: &str,
        lead_id: &str,
        request: SendEmailRequest,
    ) -> Result<EmailRecord, InboxError> {
        if request.to.trim().is_empty()
            || request.subject.trim().is_empty()
            || request.body.trim().is_empty()
        {
            return Err(InboxError::IncompleteEmail);
        }

        let lead = self.owned_lead(user_id, lead_id).await?;

        self.sender
            .send(&super::repository::OutboundEmail {
                to: request.to.clone(),
                subject: request.subject.clone(),
                body: request.body.clone(),
            })
            .await?;

        let record = self
            .emails
            .insert(NewEmail {
                lead_id: lead.id,
                user_id: user_id.to_string(),
                to: request.to,
                subject: request.subject,
                body: request.body,
                sent_at: Utc::now(),
            })
            .await?;
        Ok(record)
    }

    pub async fn emails(
        &self,
        user_id: &str,
        lead_id: &str,
    ) -> Result<Vec<EmailRecord>, InboxError> {
        let lead = self.owned_lead(user_id, lead_id).await?;
        Ok(self.emails.list_for_lead(&lead.id).await?)
    }

    async fn owned_lead(&self, user_id: &str, lead_id: &str) -> Result<Lead, InboxError> {
        let lead = self
            .leads
            .fetch(lead_id)
            .await?
            .ok_or(InboxError::NotFound)?;

        if lead.user_id != user_id {
            return Err(InboxError::NotFound);
        }

        Ok(lead)
    }

    async fn transition(&self, mut lead: Lead, status: LeadStatus) -> Result<Lead, InboxError> {
        self.leads.update_status(&lead.id, status).await?;
        lead.status = status;
        lead.date_updated = Some(Utc::now());
        Ok(lead)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InboxError {
    #[error("lead not found")]
    NotFound,
    #[error("note content is required")]
    EmptyNote,
    #[error("to, subject, and body are required")]
    IncompleteEmail,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Email(#[from] EmailError),
}
