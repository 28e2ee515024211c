use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::accounts::router::require_user;
use crate::accounts::service::Authenticator;
use crate::config::SessionConfig;
use crate::repository::RepositoryError;

use super::domain::{LeadFilters, LeadStatus};
use super::inbox::InboxTab;
use super::scoring::FormResponses;
use super::service::{
    IntakeError, InboxError, LeadInboxService, LeadIntakeService, SendEmailRequest,
};

/// Public form-submission payload.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionRequest {
    pub subdomain: String,
    pub responses: FormResponses,
}

/// Router for the unauthenticated submission endpoint.
pub fn submission_router(intake: Arc<LeadIntakeService>) -> Router {
    Router::new()
        .route("/api/v1/leads", post(submit_handler))
        .with_state(intake)
}

pub(crate) async fn submit_handler(
    State(intake): State<Arc<LeadIntakeService>>,
    Json(request): Json<SubmissionRequest>,
) -> Response {
    match intake.submit(&request.subdomain, request.responses).await {
        Ok(lead) => {
            let payload = json!({ "success": true, "lead_id": lead.id, "score": lead.score });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err @ (IntakeError::UnknownSite | IntakeError::FormMissing)) => {
            error_response(StatusCode::NOT_FOUND, &err.to_string())
        }
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

/// Shared state for the authenticated inbox endpoints.
pub struct InboxState {
    pub service: Arc<LeadInboxService>,
    pub auth: Arc<dyn Authenticator>,
    pub session: SessionConfig,
}

/// Router for the owner-facing lead inbox.
pub fn inbox_router(
    service: Arc<LeadInboxService>,
    auth: Arc<dyn Authenticator>,
    session: SessionConfig,
) -> Router {
    let state = Arc::new(InboxState {
        service,
        auth,
        session,
    });

    Router::new()
        .route("/api/v1/inbox", get(inbox_handler))
        .route("/api/v1/leads", get(list_handler))
        .route("/api/v1/leads/unread_count", get(unread_count_handler))
        .route("/api/v1/leads/:lead_id", get(detail_handler))
        .route("/api/v1/leads/:lead_id/status", patch(status_handler))
        .route("/api/v1/leads/:lead_id/read", post(mark_read_handler))
        .route("/api/v1/leads/:lead_id/unread", post(mark_unread_handler))
        .route(
            "/api/v1/leads/:lead_id/notes",
            get(notes_handler).post(add_note_handler),
        )
        .route(
            "/api/v1/leads/:lead_id/emails",
            get(emails_handler).post(send_email_handler),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InboxQuery {
    #[serde(default)]
    tab: InboxTab,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    status: LeadStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NoteRequest {
    content: String,
}

pub(crate) async fn inbox_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Query(query): Query<InboxQuery>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.inbox(&user.id, query.tab).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn list_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Query(filters): Query<LeadFilters>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.list(&user.id, &filters).await {
        Ok(leads) => (StatusCode::OK, Json(json!({ "leads": leads }))).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn unread_count_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.unread_count(&user.id).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "unread": count }))).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn detail_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.get(&user.id, &lead_id).await {
        Ok(lead) => (StatusCode::OK, Json(lead)).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn status_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .service
        .set_status(&user.id, &lead_id, request.status)
        .await
    {
        Ok(lead) => (StatusCode::OK, Json(lead)).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn mark_read_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.mark_read(&user.id, &lead_id).await {
        Ok(lead) => (StatusCode::OK, Json(lead)).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn mark_unread_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.mark_unread(&user.id, &lead_id).await {
        Ok(lead) => (StatusCode::OK, Json(lead)).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn notes_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.notes(&user.id, &lead_id).await {
        Ok(notes) => (StatusCode::OK, Json(json!({ "notes": notes }))).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn add_note_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
    Json(request): Json<NoteRequest>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .service
        .add_note(&user.id, &lead_id, &request.content)
        .await
    {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn emails_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.emails(&user.id, &lead_id).await {
        Ok(emails) => (StatusCode::OK, Json(json!({ "emails": emails }))).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

pub(crate) async fn send_email_handler(
    State(state): State<Arc<InboxState>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
    Json(request): Json<SendEmailRequest>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.send_email(&user.id, &lead_id, request).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => inbox_error_response(err),
    }
}

fn inbox_error_response(err: InboxError) -> Response {
    let status = match &err {
        InboxError::NotFound => StatusCode::NOT_FOUND,
        InboxError::EmptyNote | InboxError::IncompleteEmail => StatusCode::UNPROCESSABLE_ENTITY,
        InboxError::Email(_) => StatusCode::BAD_GATEWAY,
        InboxError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        InboxError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
