//! Integration tests for health probes and cross-cutting middleware.

mod common;

use axum::http::StatusCode;
use common::{get_request, parse_response_body, seeded_app};
use supporthub_api::middleware::{init_metrics, REQUEST_ID_HEADER};
use tower::ServiceExt;

#[tokio::test]
async fn test_live() {
    let app = seeded_app();

    let response = app
        .router
        .oneshot(get_request("/api/health/live"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_ready_when_record_api_answers() {
    let app = seeded_app();

    let response = app
        .router
        .oneshot(get_request("/api/health/ready"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_not_ready_when_record_api_unreachable() {
    let app = seeded_app();
    app.records.set_unreachable(true);

    let response = app
        .router
        .oneshot(get_request("/api/health/ready"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn test_health_reports_record_api() {
    let app = seeded_app();

    let response = app.router.oneshot(get_request("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["record_api"]["reachable"], true);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = seeded_app();

    let response = app
        .router
        .oneshot(get_request("/api/health/live"))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
    assert!(headers.get("strict-transport-security").is_none());
    assert!(headers.get(REQUEST_ID_HEADER).is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = seeded_app();

    let response = app
        .router
        .oneshot(get_request("/api/v1/devices"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    init_metrics().unwrap();
    let app = seeded_app();

    let _ = app
        .router
        .clone()
        .oneshot(get_request("/api/health/live"))
        .await
        .unwrap();
    let response = app.router.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}
