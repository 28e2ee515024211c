use async_trait::async_trait;

use crate::repository::RepositoryError;

use super::domain::{Form, FormDraft};

/// Storage abstraction for form definitions.
#[async_trait]
pub trait FormRepository: Send + Sync {
    async fn insert(&self, user_id: &str, draft: FormDraft) -> Result<Form, RepositoryError>;
    async fn update(&self, form: Form) -> Result<(), RepositoryError>;
    async fn fetch(&self, id: &str) -> Result<Option<Form>, RepositoryError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Form>, RepositoryError>;
}
