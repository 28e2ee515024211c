use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::{harness, responses, session, text, Harness, StaticAuthenticator, OWNER_TOKEN, SUBDOMAIN};
use crate::leads::router::{inbox_router, submission_router};

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is json")
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn authed_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("civet_session={OWNER_TOKEN}"));
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds")
}

fn protected_router(ctx: &Harness) -> Router {
    inbox_router(
        ctx.inbox.clone(),
        Arc::new(StaticAuthenticator::with_owner()),
        session(),
    )
}

async fn submit_lead(ctx: &Harness) -> String {
    let lead = ctx
        .intake
        .submit(
            SUBDOMAIN,
            responses(&[
                ("name", text("Jordan Avery")),
                ("email", text("jordan@example.com")),
                ("case_type", text("Personal Injury")),
            ]),
        )
        .await
        .expect("submission succeeds");
    lead.id
}

#[tokio::test]
async fn public_submission_returns_created_with_score() {
    let ctx = harness().await;
    let router = submission_router(ctx.intake.clone());

    let request = json_request(
        "POST",
        "/api/v1/leads",
        json!({
            "subdomain": SUBDOMAIN,
            "responses": {
                "name": "Jordan Avery",
                "case_type": "Personal Injury",
                "budget": "8000",
            },
        }),
    );
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["score"], json!(15));
    assert!(body["lead_id"].as_str().is_some());
}

#[tokio::test]
async fn submission_to_unknown_subdomain_is_not_found() {
    let ctx = harness().await;
    let router = submission_router(ctx.intake.clone());

    let request = json_request(
        "POST",
        "/api/v1/leads",
        json!({ "subdomain": "nope", "responses": {} }),
    );
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn inbox_routes_reject_missing_sessions() {
    let ctx = harness().await;
    let router = protected_router(&ctx);

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/inbox")
        .body(Body::empty())
        .expect("request builds");
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("not authenticated"));
}

#[tokio::test]
async fn inbox_routes_reject_unknown_tokens() {
    let ctx = harness().await;
    let router = protected_router(&ctx);

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/inbox")
        .header(header::COOKIE, "civet_session=tok-forged")
        .body(Body::empty())
        .expect("request builds");
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inbox_view_includes_counts_and_entries() {
    let ctx = harness().await;
    submit_lead(&ctx).await;
    let router = protected_router(&ctx);

    let request = authed_request("GET", "/api/v1/inbox?tab=unread", None);
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tab"], json!("unread"));
    assert_eq!(body["counts"]["unread"], json!(1));
    assert_eq!(
        body["entries"][0]["contact_name"],
        json!("Jordan Avery")
    );
}

#[tokio::test]
async fn list_route_honors_score_filters() {
    let ctx = harness().await;
    submit_lead(&ctx).await;
    let router = protected_router(&ctx);

    let request = authed_request("GET", "/api/v1/leads?min_score=100", None);
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["leads"], json!([]));
}

#[tokio::test]
async fn bearer_token_is_accepted_in_place_of_the_cookie() {
    let ctx = harness().await;
    submit_lead(&ctx).await;
    let router = protected_router(&ctx);

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/leads/unread_count")
        .header(header::AUTHORIZATION, format!("Bearer {OWNER_TOKEN}"))
        .body(Body::empty())
        .expect("request builds");
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], json!(1));
}

#[tokio::test]
async fn status_route_transitions_the_lead() {
    let ctx = harness().await;
    let lead_id = submit_lead(&ctx).await;
    let router = protected_router(&ctx);

    let request = authed_request(
        "PATCH",
        &format!("/api/v1/leads/{lead_id}/status"),
        Some(json!({ "status": "qualified" })),
    );
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("qualified"));
}

#[tokio::test]
async fn read_and_unread_routes_flip_the_flag() {
    let ctx = harness().await;
    let lead_id = submit_lead(&ctx).await;

    let request = authed_request("POST", &format!("/api/v1/leads/{lead_id}/read"), None);
    let (status, body) = send(protected_router(&ctx), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("contacted"));

    let request = authed_request("POST", &format!("/api/v1/leads/{lead_id}/unread"), None);
    let (status, body) = send(protected_router(&ctx), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("new"));
}

#[tokio::test]
async fn missing_leads_are_not_found() {
    let ctx = harness().await;
    let router = protected_router(&ctx);

    let request = authed_request("GET", "/api/v1/leads/lead-404", None);
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn note_routes_create_and_list() {
    let ctx = harness().await;
    let lead_id = submit_lead(&ctx).await;

    let request = authed_request(
        "POST",
        &format!("/api/v1/leads/{lead_id}/notes"),
        Some(json!({ "content": "Called back" })),
    );
    let (status, body) = send(protected_router(&ctx), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], json!("Called back"));

    let request = authed_request("GET", &format!("/api/v1/leads/{lead_id}/notes"), None);
    let (status, body) = send(protected_router(&ctx), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn blank_notes_are_unprocessable() {
    let ctx = harness().await;
    let lead_id = submit_lead(&ctx).await;

    let request = authed_request(
        "POST",
        &format!("/api/v1/leads/{lead_id}/notes"),
        Some(json!({ "content": "  " })),
    );
    let (status, _) = send(protected_router(&ctx), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn email_routes_send_and_list() {
    let ctx = harness().await;
    let lead_id = submit_lead(&ctx).await;

    let request = authed_request(
        "POST",
        &format!("/api/v1/leads/{lead_id}/emails"),
        Some(json!({
            "to": "jordan@example.com",
            "subject": "Your consultation",
            "body": "Thanks for reaching out.",
        })),
    );
    let (status, body) = send(protected_router(&ctx), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["to"], json!("jordan@example.com"));
    assert_eq!(ctx.sender.sent.lock().expect("sender mutex").len(), 1);

    let request = authed_request("GET", &format!("/api/v1/leads/{lead_id}/emails"), None);
    let (status, body) = send(protected_router(&ctx), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emails"].as_array().map(Vec::len), Some(1));
}
