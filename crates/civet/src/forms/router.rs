use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::accounts::router::require_user;
use crate::accounts::service::Authenticator;
use crate::config::SessionConfig;
use crate::repository::RepositoryError;

use super::domain::FormDraft;
use super::service::{FormService, FormServiceError};

pub struct FormState {
    pub service: Arc<FormService>,
    pub auth: Arc<dyn Authenticator>,
    pub session: SessionConfig,
}

/// Router for the owner-facing form builder CRUD.
pub fn form_router(
    service: Arc<FormService>,
    auth: Arc<dyn Authenticator>,
    session: SessionConfig,
) -> Router {
    let state = Arc::new(FormState {
        service,
        auth,
        session,
    });

    Router::new()
        .route("/api/v1/forms", get(list_handler).post(create_handler))
        .route(
            "/api/v1/forms/:form_id",
            get(detail_handler).put(update_handler),
        )
        .with_state(state)
}

pub(crate) async fn list_handler(
    State(state): State<Arc<FormState>>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.list(&user.id).await {
        Ok(forms) => (StatusCode::OK, Json(json!({ "forms": forms }))).into_response(),
        Err(err) => form_error_response(err),
    }
}

pub(crate) async fn create_handler(
    State(state): State<Arc<FormState>>,
    headers: HeaderMap,
    Json(draft): Json<FormDraft>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.create(&user.id, draft).await {
        Ok(form) => (StatusCode::CREATED, Json(form)).into_response(),
        Err(err) => form_error_response(err),
    }
}

pub(crate) async fn detail_handler(
    State(state): State<Arc<FormState>>,
    headers: HeaderMap,
    Path(form_id): Path<String>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.get(&user.id, &form_id).await {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(err) => form_error_response(err),
    }
}

pub(crate) async fn update_handler(
    State(state): State<Arc<FormState>>,
    headers: HeaderMap,
    Path(form_id): Path<String>,
    Json(draft): Json<FormDraft>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.update(&user.id, &form_id, draft).await {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(err) => form_error_response(err),
    }
}

fn form_error_response(err: FormServiceError) -> Response {
    let status = match &err {
        FormServiceError::MissingName => StatusCode::UNPROCESSABLE_ENTITY,
        FormServiceError::NotFound => StatusCode::NOT_FOUND,
        FormServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        FormServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        FormServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
