//! Civet: backend for a landing-page builder aimed at professional-services
//! businesses. Owners publish a landing page on a subdomain, visitors submit a
//! multi-step intake form, submissions are scored against the form's rule set,
//! and the resulting leads land in an inbox-style dashboard.
//!
//! All persistence goes through a Directus instance; the repository traits in
//! each module keep the services testable without one.

pub mod accounts;
pub mod config;
pub mod directus;
pub mod error;
pub mod forms;
pub mod leads;
pub mod pages;
pub mod repository;
pub mod telemetry;
