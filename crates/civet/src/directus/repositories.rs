//! Directus-backed implementations of the repository traits. All traffic runs
//! through the admin session; row visibility is enforced by the services'
//! owner scoping, not by per-user backend tokens.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::forms::domain::{Form, FormDraft};
use crate::forms::repository::FormRepository;
use crate::leads::domain::{
    EmailRecord, Lead, LeadFilters, LeadStatus, NewEmail, NewLead, NewNote, Note,
};
use crate::leads::repository::{EmailRepository, LeadRepository, NoteRepository};
use crate::pages::domain::{Page, PageDraft};
use crate::pages::repository::PageRepository;
use crate::repository::RepositoryError;

use super::admin::AdminSession;
use super::client::{DirectusError, ItemQuery};

const PAGES: &str = "pages";
const FORMS: &str = "forms";
const LEADS: &str = "leads";
const NOTES: &str = "notes";
const EMAILS: &str = "emails";

fn repo_error(err: DirectusError) -> RepositoryError {
    match &err {
        DirectusError::Api { status: 404, .. } => RepositoryError::NotFound,
        DirectusError::Api { message, .. } if message.to_lowercase().contains("unique") => {
            RepositoryError::Conflict
        }
        _ => RepositoryError::Unavailable(err.to_string()),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RepositoryError> {
    serde_json::to_value(value).map_err(|err| RepositoryError::Unavailable(err.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|err| RepositoryError::Unavailable(format!("malformed record: {err}")))
}

fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>, RepositoryError> {
    values.into_iter().map(decode).collect()
}

async fn token(session: &AdminSession) -> Result<String, RepositoryError> {
    session.ensure_authenticated().await.map_err(repo_error)
}

/// Shared handle so the five collection repositories stay one-liners to build.
#[derive(Clone)]
pub struct DirectusStore {
    session: Arc<AdminSession>,
}

impl DirectusStore {
    pub fn new(session: Arc<AdminSession>) -> Self {
        Self { session }
    }

    pub fn pages(&self) -> DirectusPageRepository {
        DirectusPageRepository {
            session: self.session.clone(),
        }
    }

    pub fn forms(&self) -> DirectusFormRepository {
        DirectusFormRepository {
            session: self.session.clone(),
        }
    }

    pub fn leads(&self) -> DirectusLeadRepository {
        DirectusLeadRepository {
            session: self.session.clone(),
        }
    }

    pub fn notes(&self) -> DirectusNoteRepository {
        DirectusNoteRepository {
            session: self.session.clone(),
        }
    }

    pub fn emails(&self) -> DirectusEmailRepository {
        DirectusEmailRepository {
            session: self.session.clone(),
        }
    }
}

pub struct DirectusPageRepository {
    session: Arc<AdminSession>,
}

#[async_trait]
impl PageRepository for DirectusPageRepository {
    async fn insert(&self, user_id: &str, draft: PageDraft) -> Result<Page, RepositoryError> {
        let token = token(&self.session).await?;
        let mut body = encode(&draft)?;
        body["user_id"] = json!(user_id);
        let created = self
            .session
            .client()
            .create_item(&token, PAGES, &body)
            .await
            .map_err(repo_error)?;
        decode(created)
    }

    async fn update(&self, page: Page) -> Result<(), RepositoryError> {
        let token = token(&self.session).await?;
        let patch = encode(&page)?;
        self.session
            .client()
            .update_item(&token, PAGES, &page.id, &patch)
            .await
            .map_err(repo_error)?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Page>, RepositoryError> {
        let token = token(&self.session).await?;
        match self.session.client().read_item(&token, PAGES, id).await {
            Ok(value) => Ok(Some(decode(value)?)),
            Err(DirectusError::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(repo_error(err)),
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Page>, RepositoryError> {
        let token = token(&self.session).await?;
        let query = ItemQuery::filtered(json!({ "user_id": { "_eq": user_id } }))
            .sort("-date_created");
        let values = self
            .session
            .client()
            .read_items(&token, PAGES, &query)
            .await
            .map_err(repo_error)?;
        decode_all(values)
    }

    async fn published_for_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<Page>, RepositoryError> {
        let token = token(&self.session).await?;
        let query = ItemQuery::filtered(json!({
            "_and": [
                { "subdomain": { "_eq": subdomain } },
                { "published": { "_eq": true } },
            ]
        }))
        .limit(1);
        let mut values = self
            .session
            .client()
            .read_items(&token, PAGES, &query)
            .await
            .map_err(repo_error)?;

        match values.pop() {
            Some(value) => Ok(Some(decode(value)?)),
            None => Ok(None),
        }
    }
}

pub struct DirectusFormRepository {
    session: Arc<AdminSession>,
}

#[async_trait]
impl FormRepository for DirectusFormRepository {
    async fn insert(&self, user_id: &str, draft: FormDraft) -> Result<Form, RepositoryError> {
        let token = token(&self.session).await?;
        let mut body = encode(&draft)?;
        body["user_id"] = json!(user_id);
        let created = self
            .session
            .client()
            .create_item(&token, FORMS, &body)
            .await
            .map_err(repo_error)?;
        decode(created)
    }

    async fn update(&self, form: Form) -> Result<(), RepositoryError> {
        let token = token(&self.session).await?;
        let patch = encode(&form)?;
        self.session
            .client()
            .update_item(&token, FORMS, &form.id, &patch)
            .await
            .map_err(repo_error)?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Form>, RepositoryError> {
        let token = token(&self.session).await?;
        match self.session.client().read_item(&token, FORMS, id).await {
            Ok(value) => Ok(Some(decode(value)?)),
            Err(DirectusError::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(repo_error(err)),
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Form>, RepositoryError> {
        let token = token(&self.session).await?;
        let query = ItemQuery::filtered(json!({ "user_id": { "_eq": user_id } }))
            .sort("-date_created");
        let values = self
            .session
            .client()
            .read_items(&token, FORMS, &query)
            .await
            .map_err(repo_error)?;
        decode_all(values)
    }
}

pub struct DirectusLeadRepository {
    session: Arc<AdminSession>,
}

fn lead_filter(user_id: &str, filters: &LeadFilters) -> Value {
    let mut clauses = vec![json!({ "user_id": { "_eq": user_id } })];

    if let Some(status) = filters.status {
        clauses.push(json!({ "status": { "_eq": status.label() } }));
    }
    if let Some(min) = filters.min_score {
        clauses.push(json!({ "score": { "_gte": min } }));
    }
    if let Some(max) = filters.max_score {
        clauses.push(json!({ "score": { "_lte": max } }));
    }
    if let Some(start) = filters.start_date {
        clauses.push(json!({ "date_created": { "_gte": start.to_rfc3339() } }));
    }
    if let Some(end) = filters.end_date {
        clauses.push(json!({ "date_created": { "_lte": end.to_rfc3339() } }));
    }

    json!({ "_and": clauses })
}

#[async_trait]
impl LeadRepository for DirectusLeadRepository {
    async fn insert(&self, lead: NewLead) -> Result<Lead, RepositoryError> {
        let token = token(&self.session).await?;
        let body = encode(&lead)?;
        let created = self
            .session
            .client()
            .create_item(&token, LEADS, &body)
            .await
            .map_err(repo_error)?;
        decode(created)
    }

    async fn update_status(&self, id: &str, status: LeadStatus) -> Result<(), RepositoryError> {
        let token = token(&self.session).await?;
        let patch = json!({ "status": status.label() });
        self.session
            .client()
            .update_item(&token, LEADS, id, &patch)
            .await
            .map_err(repo_error)?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Lead>, RepositoryError> {
        let token = token(&self.session).await?;
        match self.session.client().read_item(&token, LEADS, id).await {
            Ok(value) => Ok(Some(decode(value)?)),
            Err(DirectusError::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(repo_error(err)),
        }
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filters: &LeadFilters,
    ) -> Result<Vec<Lead>, RepositoryError> {
        let token = token(&self.session).await?;
        let query = ItemQuery::filtered(lead_filter(user_id, filters)).sort("-date_created");
        let values = self
            .session
            .client()
            .read_items(&token, LEADS, &query)
            .await
            .map_err(repo_error)?;
        decode_all(values)
    }

    async fn unread_count(&self, user_id: &str) -> Result<u64, RepositoryError> {
        let filters = LeadFilters {
            status: Some(LeadStatus::New),
            ..LeadFilters::default()
        };
        Ok(self.list_for_user(user_id, &filters).await?.len() as u64)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let token = token(&self.session).await?;
        self.session
            .client()
            .delete_item(&token, LEADS, id)
            .await
            .map_err(repo_error)
    }
}

pub struct DirectusNoteRepository {
    session: Arc<AdminSession>,
}

#[async_trait]
impl NoteRepository for DirectusNoteRepository {
    async fn insert(&self, note: NewNote) -> Result<Note, RepositoryError> {
        let token = token(&self.session).await?;
        let body = encode(&note)?;
        let created = self
            .session
            .client()
            .create_item(&token, NOTES, &body)
            .await
            .map_err(repo_error)?;
        decode(created)
    }

    async fn list_for_lead(&self, lead_id: &str) -> Result<Vec<Note>, RepositoryError> {
        let token = token(&self.session).await?;
        let query =
            ItemQuery::filtered(json!({ "lead_id": { "_eq": lead_id } })).sort("date_created");
        let values = self
            .session
            .client()
            .read_items(&token, NOTES, &query)
            .await
            .map_err(repo_error)?;
        decode_all(values)
    }
}

pub struct DirectusEmailRepository {
    session: Arc<AdminSession>,
}

#[async_trait]
impl EmailRepository for DirectusEmailRepository {
    async fn insert(&self, email: NewEmail) -> Result<EmailRecord, RepositoryError> {
        let token = token(&self.session).await?;
        let body = encode(&email)?;
        let created = self
            .session
            .client()
            .create_item(&token, EMAILS, &body)
            .await
            .map_err(repo_error)?;
        decode(created)
    }

    async fn list_for_lead(&self, lead_id: &str) -> Result<Vec<EmailRecord>, RepositoryError> {
        let token = token(&self.session).await?;
        let query = ItemQuery::filtered(json!({ "lead_id": { "_eq": lead_id } })).sort("sent_at");
        let values = self
            .session
            .client()
            .read_items(&token, EMAILS, &query)
            .await
            .map_err(repo_error)?;
        decode_all(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_filter_includes_only_set_criteria() {
        let filters = LeadFilters {
            status: Some(LeadStatus::New),
            min_score: Some(10),
            ..LeadFilters::default()
        };

        let filter = lead_filter("u-1", &filters);
        let clauses = filter["_and"].as_array().expect("conjunction");
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[0]["user_id"]["_eq"], "u-1");
        assert_eq!(clauses[1]["status"]["_eq"], "new");
        assert_eq!(clauses[2]["score"]["_gte"], 10);
    }

    #[test]
    fn maps_not_found_and_conflict() {
        let not_found = DirectusError::Api {
            status: 404,
            message: "missing".to_string(),
        };
        assert!(matches!(repo_error(not_found), RepositoryError::NotFound));

        let conflict = DirectusError::Api {
            status: 400,
            message: "Field \"subdomain\" has to be UNIQUE.".to_string(),
        };
        assert!(matches!(repo_error(conflict), RepositoryError::Conflict));
    }
}
