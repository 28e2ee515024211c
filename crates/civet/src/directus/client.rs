use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Thin REST client for a Directus instance. Holds no token of its own;
/// callers pass the token for each request so the same client serves both
/// session-scoped and admin-scoped traffic.
#[derive(Debug, Clone)]
pub struct DirectusClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectusError {
    #[error("backend transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend rejected request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("backend response missing expected data")]
    MalformedResponse,
}

impl DirectusError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DirectusError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
}

/// Access/refresh token pair issued by `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Query parameters for item listing; maps onto Directus's `filter`, `limit`,
/// and `sort` query string.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub filter: Option<Value>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
}

impl ItemQuery {
    pub fn filtered(filter: Value) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

impl DirectusClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, DirectusError> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        decode::<AuthTokens>(response).await
    }

    /// Fetch the user the token belongs to.
    pub async fn read_me(&self, token: &str) -> Result<Value, DirectusError> {
        let response = self
            .http
            .get(format!("{}/users/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        decode::<Value>(response).await
    }

    pub async fn create_user(&self, token: &str, payload: &Value) -> Result<Value, DirectusError> {
        let response = self
            .http
            .post(format!("{}/users", self.base_url))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        decode::<Value>(response).await
    }

    pub async fn read_users(
        &self,
        token: &str,
        query: &ItemQuery,
    ) -> Result<Vec<Value>, DirectusError> {
        let response = self
            .http
            .get(format!("{}/users", self.base_url))
            .bearer_auth(token)
            .query(&query.query_pairs())
            .send()
            .await?;
        decode::<Vec<Value>>(response).await
    }

    /// Look up role ids by role name.
    pub async fn read_roles(&self, token: &str, name: &str) -> Result<Vec<Value>, DirectusError> {
        let query = ItemQuery::filtered(json!({ "name": { "_eq": name } })).limit(1);
        let response = self
            .http
            .get(format!("{}/roles", self.base_url))
            .bearer_auth(token)
            .query(&query.query_pairs())
            .send()
            .await?;
        decode::<Vec<Value>>(response).await
    }

    pub async fn create_item(
        &self,
        token: &str,
        collection: &str,
        body: &Value,
    ) -> Result<Value, DirectusError> {
        let response = self
            .http
            .post(format!("{}/items/{collection}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        decode::<Value>(response).await
    }

    pub async fn read_item(
        &self,
        token: &str,
        collection: &str,
        id: &str,
    ) -> Result<Value, DirectusError> {
        let response = self
            .http
            .get(format!("{}/items/{collection}/{id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        decode::<Value>(response).await
    }

    pub async fn read_items(
        &self,
        token: &str,
        collection: &str,
        query: &ItemQuery,
    ) -> Result<Vec<Value>, DirectusError> {
        let response = self
            .http
            .get(format!("{}/items/{collection}", self.base_url))
            .bearer_auth(token)
            .query(&query.query_pairs())
            .send()
            .await?;
        decode::<Vec<Value>>(response).await
    }

    pub async fn update_item(
        &self,
        token: &str,
        collection: &str,
        id: &str,
        patch: &Value,
    ) -> Result<Value, DirectusError> {
        let response = self
            .http
            .patch(format!("{}/items/{collection}/{id}", self.base_url))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        decode::<Value>(response).await
    }

    pub async fn delete_item(
        &self,
        token: &str,
        collection: &str,
        id: &str,
    ) -> Result<(), DirectusError> {
        let response = self
            .http
            .delete(format!("{}/items/{collection}/{id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(api_error(status.as_u16(), response).await)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DirectusError> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status.as_u16(), response).await);
    }

    let envelope = response
        .json::<Envelope<T>>()
        .await
        .map_err(|_| DirectusError::MalformedResponse)?;
    Ok(envelope.data)
}

async fn api_error(status: u16, response: reqwest::Response) -> DirectusError {
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body
            .errors
            .into_iter()
            .next()
            .map(|entry| entry.message)
            .unwrap_or_else(|| "unknown error".to_string()),
        Err(_) => "unknown error".to_string(),
    };

    DirectusError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = DirectusClient::new("http://localhost:8055/");
        assert_eq!(client.base_url(), "http://localhost:8055");
    }

    #[test]
    fn item_query_serializes_filter_and_limit() {
        let query = ItemQuery::filtered(json!({ "status": { "_eq": "new" } }))
            .limit(5)
            .sort("-date_created");
        let pairs = query.query_pairs();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0, "filter");
        assert_eq!(pairs[0].1, r#"{"status":{"_eq":"new"}}"#);
        assert_eq!(pairs[1], ("limit", "5".to_string()));
        assert_eq!(pairs[2], ("sort", "-date_created".to_string()));
    }
}
