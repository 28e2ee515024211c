//! Landing pages: owner CRUD plus the public site lookup.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Page, PageDraft};
pub use repository::PageRepository;
pub use router::{page_router, site_router};
pub use service::{PageService, PageServiceError, SiteView};
