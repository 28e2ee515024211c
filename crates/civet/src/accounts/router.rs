use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::config::SessionConfig;

use super::domain::SignupRequest;
use super::service::{AccountService, AuthError, Authenticator};

/// Shared state for the auth endpoints.
pub struct AuthState {
    pub service: Arc<AccountService>,
    pub session: SessionConfig,
}

/// Router builder exposing signup, login, logout, and session lookup.
pub fn auth_router(service: Arc<AccountService>, session: SessionConfig) -> Router {
    let state = Arc::new(AuthState { service, session });
    Router::new()
        .route("/api/v1/auth/signup", post(signup_handler))
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
        .route("/api/v1/auth/me", get(me_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

pub(crate) async fn signup_handler(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<SignupRequest>,
) -> Response {
    match state.service.signup(request).await {
        Ok(user_id) => {
            let payload = json!({ "user_id": user_id });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err @ (AuthError::DuplicateEmail | AuthError::DuplicateSubdomain)) => {
            error_response(StatusCode::CONFLICT, &err)
        }
        Err(
            err @ (AuthError::InvalidEmail
            | AuthError::InvalidSubdomain
            | AuthError::MissingPassword),
        ) => error_response(StatusCode::UNPROCESSABLE_ENTITY, &err),
        Err(err @ AuthError::RoleMissing) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err)
        }
        Err(err) => error_response(StatusCode::BAD_GATEWAY, &err),
    }
}

pub(crate) async fn login_handler(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match state
        .service
        .login(&request.email, &request.password)
        .await
    {
        Ok(token) => {
            let cookie = session_cookie(&state.session, &token);
            let payload = json!({ "success": true });
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(payload),
            )
                .into_response()
        }
        Err(err @ AuthError::InvalidCredentials) => {
            error_response(StatusCode::UNAUTHORIZED, &err)
        }
        Err(err) => error_response(StatusCode::BAD_GATEWAY, &err),
    }
}

pub(crate) async fn logout_handler(State(state): State<Arc<AuthState>>) -> Response {
    let cookie = clear_session_cookie(&state.session);
    let payload = json!({ "success": true });
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(payload),
    )
        .into_response()
}

pub(crate) async fn me_handler(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    match require_user(state.service.as_ref(), &state.session, &headers).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(response) => response,
    }
}

/// Resolve the session from request headers, or produce the 401 response.
/// Accepts the session cookie or an `Authorization: Bearer` header.
pub async fn require_user(
    auth: &dyn Authenticator,
    session: &SessionConfig,
    headers: &HeaderMap,
) -> Result<super::domain::User, Response> {
    let Some(token) = session_token(headers, &session.cookie_name) else {
        return Err(unauthorized());
    };

    auth.authenticate(&token).await.map_err(|_| unauthorized())
}

fn unauthorized() -> Response {
    let payload = json!({ "error": "not authenticated" });
    (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
}

fn error_response(status: StatusCode, err: &AuthError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}

/// Build the `Set-Cookie` value for a fresh session.
pub fn session_cookie(config: &SessionConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        config.cookie_name, config.max_age_seconds
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that expires the session.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        config.cookie_name
    )
}

/// Extract the session token from the cookie or bearer header.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(cookie_name) {
                if let Some(token) = parts.next() {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}
