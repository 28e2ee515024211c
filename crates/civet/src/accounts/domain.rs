use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application-facing view of a Directus user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub subdomain: String,
    pub date_created: DateTime<Utc>,
}

/// Self-service signup payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub subdomain: String,
}

/// Minimal structural check; deliverability is the mail provider's problem.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    let mut domain_parts = domain.split('.');
    domain_parts.all(|part| !part.is_empty() && !part.contains(char::is_whitespace))
        && domain.contains('.')
        && !local.contains(char::is_whitespace)
}

/// Subdomains are lowercase alphanumeric plus hyphens, 3-63 characters.
pub fn is_valid_subdomain(subdomain: &str) -> bool {
    (3..=63).contains(&subdomain.len())
        && subdomain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
