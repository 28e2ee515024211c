//! Leads: scoring, intake, and the inbox dashboard.

pub mod domain;
pub mod inbox;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    EmailRecord, Lead, LeadFilters, LeadStatus, NewEmail, NewLead, NewNote, Note,
};
pub use inbox::{InboxEntryView, InboxTab, InboxView, TabCounts};
pub use repository::{
    EmailError, EmailRepository, EmailSender, LeadRepository, NoteRepository, OutboundEmail,
};
pub use router::{inbox_router, submission_router};
pub use scoring::{score, FormResponses, ResponseValue, RuleOperator, ScoringRule};
pub use service::{
    InboxError, IntakeError, LeadInboxService, LeadIntakeService, SendEmailRequest,
};
