use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repository::RepositoryError;

use super::domain::{EmailRecord, Lead, LeadFilters, LeadStatus, NewEmail, NewLead, NewNote, Note};

/// Storage abstraction for leads.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn insert(&self, lead: NewLead) -> Result<Lead, RepositoryError>;
    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<(), RepositoryError>;
    async fn fetch(&self, id: &str) -> Result<Option<Lead>, RepositoryError>;
    async fn list_for_user(
        &self,
        user_id: &str,
        filters: &LeadFilters,
    ) -> Result<Vec<Lead>, RepositoryError>;
    async fn unread_count(&self, user_id: &str) -> Result<u64, RepositoryError>;
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// Storage abstraction for lead notes.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert(&self, note: NewNote) -> Result<Note, RepositoryError>;
    async fn list_for_lead(&self, lead_id: &str) -> Result<Vec<Note>, RepositoryError>;
}

/// Storage abstraction for the sent-email log.
#[async_trait]
pub trait EmailRepository: Send + Sync {
    async fn insert(&self, email: NewEmail) -> Result<EmailRecord, RepositoryError>;
    async fn list_for_lead(&self, lead_id: &str) -> Result<Vec<EmailRecord>, RepositoryError>;
}

/// Outbound message handed to the delivery transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Trait describing the email delivery transport (e.g. a Resend adapter).
/// Delivery itself is an external collaborator; the service only records
/// what was dispatched.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email transport unavailable: {0}")]
    Transport(String),
}
