use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::directus::{AdminSession, DirectusClient, DirectusError};

use super::domain::{is_valid_email, is_valid_subdomain, SignupRequest, User};

/// Resolves a session token to the user it belongs to. Split out as a trait
/// so protected routers can be exercised without a Directus instance.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<User, AuthError>;
}

/// Signup, login, and session lookup against the Directus user store.
/// Signup runs through the admin session because new accounts need the
/// "User" role and immediate activation, which the public API cannot grant.
pub struct AccountService {
    client: Arc<DirectusClient>,
    admin: Arc<AdminSession>,
    user_role: String,
}

impl AccountService {
    pub fn new(client: Arc<DirectusClient>, admin: Arc<AdminSession>, user_role: String) -> Self {
        Self {
            client,
            admin,
            user_role,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<String, AuthError> {
        if !is_valid_email(&request.email) {
            return Err(AuthError::InvalidEmail);
        }
        let subdomain = request.subdomain.to_lowercase();
        if !is_valid_subdomain(&subdomain) {
            return Err(AuthError::InvalidSubdomain);
        }
        if request.password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let token = self.admin.ensure_authenticated().await?;

        let roles = match self.client.read_roles(&token, &self.user_role).await {
            Ok(roles) => roles,
            // A stale admin token is the one failure worth one retry.
            Err(err) if err.status() == Some(401) => {
                self.admin.invalidate().await;
                let token = self.admin.ensure_authenticated().await?;
                self.client.read_roles(&token, &self.user_role).await?
            }
            Err(err) => return Err(err.into()),
        };

        let role_id = roles
            .first()
            .and_then(|role| role.get("id"))
            .and_then(Value::as_str)
            .ok_or(AuthError::RoleMissing)?
            .to_string();

        let payload = json!({
            "email": request.email,
            "password": request.password,
            "first_name": request.name,
            "subdomain": subdomain,
            "role": role_id,
            "status": "active",
        });

        let token = self.admin.ensure_authenticated().await?;
        let created = self
            .client
            .create_user(&token, &payload)
            .await
            .map_err(classify_signup_error)?;

        created
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AuthError::Backend(DirectusError::MalformedResponse))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        match self.client.login(email, password).await {
            Ok(tokens) => Ok(tokens.access_token),
            Err(err) if matches!(err.status(), Some(400) | Some(401)) => {
                Err(AuthError::InvalidCredentials)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let record = match self.client.read_me(token).await {
            Ok(record) => record,
            Err(err) if matches!(err.status(), Some(401) | Some(403)) => {
                return Err(AuthError::Unauthorized)
            }
            Err(err) => return Err(err.into()),
        };

        Ok(user_from_record(&record))
    }
}

#[async_trait]
impl Authenticator for AccountService {
    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        self.current_user(token).await
    }
}

fn user_from_record(record: &Value) -> User {
    let field = |name: &str| {
        record
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let date_created = record
        .get("date_created")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    User {
        id: field("id"),
        email: field("email"),
        name: field("first_name"),
        subdomain: field("subdomain"),
        date_created,
    }
}

/// Directus reports constraint violations as messages, not codes; classify
/// duplicates the same way the dashboard expects to present them.
fn classify_signup_error(err: DirectusError) -> AuthError {
    if let DirectusError::Api { message, .. } = &err {
        let lowered = message.to_lowercase();
        if lowered.contains("subdomain") {
            return AuthError::DuplicateSubdomain;
        }
        if lowered.contains("email") || lowered.contains("unique") {
            return AuthError::DuplicateEmail;
        }
    }
    AuthError::Backend(err)
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("a valid email address is required")]
    InvalidEmail,
    #[error("subdomain must be 3-63 lowercase alphanumeric characters or hyphens")]
    InvalidSubdomain,
    #[error("a password is required")]
    MissingPassword,
    #[error("this email is already registered")]
    DuplicateEmail,
    #[error("this subdomain is already taken")]
    DuplicateSubdomain,
    #[error("signup role is not configured")]
    RoleMissing,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not authenticated")]
    Unauthorized,
    #[error(transparent)]
    Backend(#[from] DirectusError),
}
