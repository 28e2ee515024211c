use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::DirectusConfig;

use super::client::{DirectusClient, DirectusError};

/// Credentials used for privileged backend operations (signup, seed tooling).
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

/// Source of admin credentials, injected so tests and alternative deployments
/// can swap it without touching the session.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> AdminCredentials;
}

/// Credential provider backed by the loaded configuration.
#[derive(Debug, Clone)]
pub struct ConfigCredentials {
    credentials: AdminCredentials,
}

impl ConfigCredentials {
    pub fn new(config: &DirectusConfig) -> Self {
        Self {
            credentials: AdminCredentials {
                email: config.admin_email.clone(),
                password: config.admin_password.clone(),
            },
        }
    }
}

impl CredentialProvider for ConfigCredentials {
    fn credentials(&self) -> AdminCredentials {
        self.credentials.clone()
    }
}

/// Cached admin authentication handle. `ensure_authenticated` is idempotent:
/// concurrent callers share one login, a failed login clears the cache so the
/// next call retries, and a 401 on a later request can be answered with
/// `invalidate` followed by a fresh `ensure_authenticated`.
pub struct AdminSession {
    client: Arc<DirectusClient>,
    provider: Arc<dyn CredentialProvider>,
    token: Mutex<Option<String>>,
}

impl AdminSession {
    pub fn new(client: Arc<DirectusClient>, provider: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            provider,
            token: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &DirectusClient {
        &self.client
    }

    pub async fn ensure_authenticated(&self) -> Result<String, DirectusError> {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }

        let credentials = self.provider.credentials();
        let tokens = self
            .client
            .login(&credentials.email, &credentials.password)
            .await?;

        *guard = Some(tokens.access_token.clone());
        Ok(tokens.access_token)
    }

    /// Drop the cached token, forcing the next call to log in again.
    pub async fn invalidate(&self) {
        let mut guard = self.token.lock().await;
        *guard = None;
    }
}
