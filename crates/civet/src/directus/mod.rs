//! Integration with the Directus backend: a thin REST client, the cached
//! admin session, and Directus-backed repository implementations.

mod admin;
mod client;
pub mod repositories;

pub use admin::{AdminCredentials, AdminSession, ConfigCredentials, CredentialProvider};
pub use client::{AuthTokens, DirectusClient, DirectusError, ItemQuery};
pub use repositories::DirectusStore;
