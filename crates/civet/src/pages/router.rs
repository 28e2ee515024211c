use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::accounts::router::require_user;
use crate::accounts::service::Authenticator;
use crate::config::SessionConfig;
use crate::repository::RepositoryError;

use super::domain::PageDraft;
use super::service::{PageService, PageServiceError};

pub struct PageState {
    pub service: Arc<PageService>,
    pub auth: Arc<dyn Authenticator>,
    pub session: SessionConfig,
}

/// Public router serving landing-page data by subdomain.
pub fn site_router(service: Arc<PageService>) -> Router {
    Router::new()
        .route("/api/v1/sites/:subdomain", get(site_handler))
        .with_state(service)
}

pub(crate) async fn site_handler(
    State(service): State<Arc<PageService>>,
    Path(subdomain): Path<String>,
) -> Response {
    match service.site(&subdomain).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => page_error_response(err),
    }
}

/// Router for the owner-facing page CRUD.
pub fn page_router(
    service: Arc<PageService>,
    auth: Arc<dyn Authenticator>,
    session: SessionConfig,
) -> Router {
    let state = Arc::new(PageState {
        service,
        auth,
        session,
    });

    Router::new()
        .route("/api/v1/pages", get(list_handler).post(create_handler))
        .route(
            "/api/v1/pages/:page_id",
            get(detail_handler).put(update_handler),
        )
        .route(
            "/api/v1/pages/:page_id/publish",
            axum::routing::post(publish_handler),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishRequest {
    published: bool,
}

pub(crate) async fn list_handler(
    State(state): State<Arc<PageState>>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.list(&user.id).await {
        Ok(pages) => (StatusCode::OK, Json(json!({ "pages": pages }))).into_response(),
        Err(err) => page_error_response(err),
    }
}

pub(crate) async fn create_handler(
    State(state): State<Arc<PageState>>,
    headers: HeaderMap,
    Json(draft): Json<PageDraft>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.create(&user.id, draft).await {
        Ok(page) => (StatusCode::CREATED, Json(page)).into_response(),
        Err(err) => page_error_response(err),
    }
}

pub(crate) async fn detail_handler(
    State(state): State<Arc<PageState>>,
    headers: HeaderMap,
    Path(page_id): Path<String>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.get(&user.id, &page_id).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => page_error_response(err),
    }
}

pub(crate) async fn update_handler(
    State(state): State<Arc<PageState>>,
    headers: HeaderMap,
    Path(page_id): Path<String>,
    Json(draft): Json<PageDraft>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.update(&user.id, &page_id, draft).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => page_error_response(err),
    }
}

pub(crate) async fn publish_handler(
    State(state): State<Arc<PageState>>,
    headers: HeaderMap,
    Path(page_id): Path<String>,
    Json(request): Json<PublishRequest>,
) -> Response {
    let user = match require_user(state.auth.as_ref(), &state.session, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .service
        .set_published(&user.id, &page_id, request.published)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => page_error_response(err),
    }
}

fn page_error_response(err: PageServiceError) -> Response {
    let status = match &err {
        PageServiceError::InvalidSubdomain => StatusCode::UNPROCESSABLE_ENTITY,
        PageServiceError::NotFound => StatusCode::NOT_FOUND,
        PageServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PageServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PageServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
