//! Form definitions: the multi-step intake wizard and its scoring rule set.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{FieldType, Form, FormDraft, FormField, FormStep};
pub use repository::FormRepository;
pub use router::form_router;
pub use service::{FormService, FormServiceError};
