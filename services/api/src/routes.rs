use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

use civet::accounts::{auth_router, AccountService, Authenticator};
use civet::config::SessionConfig;
use civet::forms::{form_router, FormService};
use civet::leads::{inbox_router, submission_router, LeadInboxService, LeadIntakeService};
use civet::pages::{page_router, site_router, PageService};

use crate::infra::AppState;

/// Everything the HTTP surface needs, regardless of which backend built it.
/// `accounts` is absent in demo mode, which has no signup or login.
pub(crate) struct ServiceSet {
    pub(crate) intake: Arc<LeadIntakeService>,
    pub(crate) inbox: Arc<LeadInboxService>,
    pub(crate) pages: Arc<PageService>,
    pub(crate) forms: Arc<FormService>,
    pub(crate) accounts: Option<Arc<AccountService>>,
    pub(crate) auth: Arc<dyn Authenticator>,
    pub(crate) session: SessionConfig,
}

pub(crate) fn with_service_routes(services: ServiceSet) -> Router {
    let ServiceSet {
        intake,
        inbox,
        pages,
        forms,
        accounts,
        auth,
        session,
    } = services;

    let mut app = Router::new()
        .merge(submission_router(intake))
        .merge(site_router(pages.clone()))
        .merge(inbox_router(inbox, auth.clone(), session.clone()))
        .merge(page_router(pages, auth.clone(), session.clone()))
        .merge(form_router(forms, auth, session.clone()));

    if let Some(accounts) = accounts {
        app = app.merge(auth_router(accounts, session));
    }

    app.route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn state(ready: bool) -> AppState {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(handle),
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        let app_state = state(false);

        let response = readiness_endpoint(Extension(app_state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        app_state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(app_state))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
