//! HTTP-level tests for the webhook endpoint.
//!
//! The router is driven directly with `tower::ServiceExt::oneshot`
//! against credentials pointing at loopback port 1, so any code path
//! that reaches the gateway fails with a connection error. That makes
//! the before/after-connection split observable: a 400 means the
//! request was rejected without touching the database, a 500 with the
//! connection body means persistence was attempted.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
};
use screenhook_api::create_router;
use screenhook_core::DbConfig;
use serde_json::json;
use tower::ServiceExt;

fn unreachable_db() -> DbConfig {
    DbConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        username: "analytics".to_string(),
        password: "irrelevant".to_string(),
        database: "events".to_string(),
    }
}

fn webhook_request(publication: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/webhook/{publication}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialize payload")))
        .expect("build request")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes =
        axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn missing_event_key_rejected_before_any_connection() {
    let app = create_router(unreachable_db());

    let payload = json!({ "id": 1, "email": "a@b.com" });
    let response = app.oneshot(webhook_request("eq1", &payload)).await.expect("execute");

    // 400, not the 500 a connection attempt would have produced.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Event type not passed");
}

#[tokio::test]
async fn non_string_event_discriminator_rejected() {
    let app = create_router(unreachable_db());

    // The platform always sends a string discriminator; a number is
    // treated the same as a missing key.
    let payload = json!({ "event": 5, "id": 1 });
    let response = app.oneshot(webhook_request("eq1", &payload)).await.expect("execute");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Event type not passed");
}

#[tokio::test]
async fn connection_failure_maps_to_connection_body() {
    let app = create_router(unreachable_db());

    let payload = json!({ "event": "user_signed_in", "id": 7 });
    let response = app.oneshot(webhook_request("eq1", &payload)).await.expect("execute");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Unable to establish a connection.");
}

#[tokio::test]
async fn unmonitored_event_still_attempts_persistence() {
    let app = create_router(unreachable_db());

    let payload = json!({ "event": "certificate_issued", "anything": true });
    let response = app.oneshot(webhook_request("eq2", &payload)).await.expect("execute");

    // The connection-failure body proves the pipeline went all the way
    // to the gateway instead of rejecting the unknown kind.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Unable to establish a connection.");
}

#[tokio::test]
async fn non_json_body_is_rejected() {
    let app = create_router(unreachable_db());

    let request = Request::builder()
        .method("POST")
        .uri("/webhook/eq1")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .expect("build request");

    let response = app.oneshot(request).await.expect("execute");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = create_router(unreachable_db());

    let payload = json!({ "event": "user_signed_in", "id": 7 });
    let response = app.oneshot(webhook_request("eq1", &payload)).await.expect("execute");

    assert!(response.headers().contains_key("X-Request-Id"));
}

#[tokio::test]
async fn health_check_does_not_need_the_database() {
    let app = create_router(unreachable_db());

    let request =
        Request::builder().method("GET").uri("/health").body(Body::empty()).expect("build");
    let response = app.oneshot(request).await.expect("execute");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn liveness_check_does_not_need_the_database() {
    let app = create_router(unreachable_db());

    let request = Request::builder().method("GET").uri("/live").body(Body::empty()).expect("build");
    let response = app.oneshot(request).await.expect("execute");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_check_reports_unavailable_database() {
    let app = create_router(unreachable_db());

    let request =
        Request::builder().method("GET").uri("/ready").body(Body::empty()).expect("build");
    let response = app.oneshot(request).await.expect("execute");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
