use std::sync::Arc;

use crate::repository::RepositoryError;

use super::domain::{Form, FormDraft};
use super::repository::FormRepository;

/// Form definition CRUD, owner-scoped. The scoring rule set travels with the
/// form; no validation is applied to individual rules since unknown operators
/// and absent fields already degrade to zero points at evaluation time.
pub struct FormService {
    forms: Arc<dyn FormRepository>,
}

impl FormService {
    pub fn new(forms: Arc<dyn FormRepository>) -> Self {
        Self { forms }
    }

    pub async fn create(
        &self,
        user_id: &str,
        draft: FormDraft,
    ) -> Result<Form, FormServiceError> {
        if draft.name.trim().is_empty() {
            return Err(FormServiceError::MissingName);
        }
        let form = self.forms.insert(user_id, draft).await?;
        Ok(form)
    }

    pub async fn update(
        &self,
        user_id: &str,
        form_id: &str,
        draft: FormDraft,
    ) -> Result<Form, FormServiceError> {
        if draft.name.trim().is_empty() {
            return Err(FormServiceError::MissingName);
        }

        let mut form = self.owned_form(user_id, form_id).await?;
        form.name = draft.name;
        form.steps = draft.steps;
        form.scoring_rules = draft.scoring_rules;

        self.forms.update(form.clone()).await?;
        Ok(form)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Form>, FormServiceError> {
        Ok(self.forms.list_for_user(user_id).await?)
    }

    pub async fn get(&self, user_id: &str, form_id: &str) -> Result<Form, FormServiceError> {
        self.owned_form(user_id, form_id).await
    }

    async fn owned_form(&self, user_id: &str, form_id: &str) -> Result<Form, FormServiceError> {
        let form = self
            .forms
            .fetch(form_id)
            .await?
            .ok_or(FormServiceError::NotFound)?;

        if form.user_id != user_id {
            return Err(FormServiceError::NotFound);
        }

        Ok(form)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormServiceError {
    #[error("form name is required")]
    MissingName,
    #[error("form not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
