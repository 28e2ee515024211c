use async_trait::async_trait;

use crate::repository::RepositoryError;

use super::domain::{Page, PageDraft};

/// Storage abstraction for landing pages so services can be exercised in
/// isolation from Directus.
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn insert(&self, user_id: &str, draft: PageDraft) -> Result<Page, RepositoryError>;
    async fn update(&self, page: Page) -> Result<(), RepositoryError>;
    async fn fetch(&self, id: &str) -> Result<Option<Page>, RepositoryError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Page>, RepositoryError>;
    async fn published_for_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<Page>, RepositoryError>;
}
