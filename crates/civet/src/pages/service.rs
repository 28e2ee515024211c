use std::sync::Arc;

use serde::Serialize;

use crate::accounts::domain::is_valid_subdomain;
use crate::forms::domain::Form;
use crate::forms::repository::FormRepository;
use crate::repository::RepositoryError;

use super::domain::{Page, PageDraft};
use super::repository::PageRepository;

/// Landing-page CRUD plus the public site lookup used by the rendered page.
pub struct PageService {
    pages: Arc<dyn PageRepository>,
    forms: Arc<dyn FormRepository>,
}

/// Everything a public landing page needs to render: hero copy plus the
/// multi-step form definition.
#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub page: Page,
    pub form: Form,
}

impl PageService {
    pub fn new(pages: Arc<dyn PageRepository>, forms: Arc<dyn FormRepository>) -> Self {
        Self { pages, forms }
    }

    pub async fn create(
        &self,
        user_id: &str,
        draft: PageDraft,
    ) -> Result<Page, PageServiceError> {
        if !is_valid_subdomain(&draft.subdomain) {
            return Err(PageServiceError::InvalidSubdomain);
        }
        let page = self.pages.insert(user_id, draft).await?;
        Ok(page)
    }

    pub async fn update(
        &self,
        user_id: &str,
        page_id: &str,
        draft: PageDraft,
    ) -> Result<Page, PageServiceError> {
        if !is_valid_subdomain(&draft.subdomain) {
            return Err(PageServiceError::InvalidSubdomain);
        }

        let mut page = self.owned_page(user_id, page_id).await?;
        page.subdomain = draft.subdomain;
        page.headline = draft.headline;
        page.description = draft.description;
        page.cta_text = draft.cta_text;
        page.form_id = draft.form_id;
        page.published = draft.published;

        self.pages.update(page.clone()).await?;
        Ok(page)
    }

    pub async fn set_published(
        &self,
        user_id: &str,
        page_id: &str,
        published: bool,
    ) -> Result<Page, PageServiceError> {
        let mut page = self.owned_page(user_id, page_id).await?;
        page.published = published;
        self.pages.update(page.clone()).await?;
        Ok(page)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Page>, PageServiceError> {
        Ok(self.pages.list_for_user(user_id).await?)
    }

    pub async fn get(&self, user_id: &str, page_id: &str) -> Result<Page, PageServiceError> {
        self.owned_page(user_id, page_id).await
    }

    /// Public lookup: the published page for a subdomain together with its
    /// form definition.
    pub async fn site(&self, subdomain: &str) -> Result<SiteView, PageServiceError> {
        let page = self
            .pages
            .published_for_subdomain(subdomain)
            .await?
            .ok_or(PageServiceError::NotFound)?;

        let form = self
            .forms
            .fetch(&page.form_id)
            .await?
            .ok_or(PageServiceError::NotFound)?;

        Ok(SiteView { page, form })
    }

    async fn owned_page(&self, user_id: &str, page_id: &str) -> Result<Page, PageServiceError> {
        let page = self
            .pages
            .fetch(page_id)
            .await?
            .ok_or(PageServiceError::NotFound)?;

        // Ownership failures read as not-found so page ids don't leak.
        if page.user_id != user_id {
            return Err(PageServiceError::NotFound);
        }

        Ok(page)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PageServiceError {
    #[error("subdomain must be 3-63 lowercase alphanumeric characters or hyphens")]
    InvalidSubdomain,
    #[error("page not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
