//! Common test utilities for integration tests.
//!
//! The router runs against an [`InMemoryRecordClient`] seeded with a small
//! fixture workspace, so no record API is needed.

// Not every integration test uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use domain::services::{Notifier, RecordClient, RecordingNotifier};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::memory::InMemoryRecordClient;
use serde_json::{json, Value};
use std::sync::Arc;
use supporthub_api::{
    app::{create_router, AppState},
    config::Config,
};

pub fn test_config() -> Config {
    Config::load_for_test(&[]).expect("Failed to load test config")
}

/// Users 1-2 are fixed; 3-5 are generated filler on the Free plan.
pub fn user_rows() -> Vec<Value> {
    let mut rows = vec![
        json!({"Id": 1, "Name": "Ada Byron", "email": "ada@acme.io", "plan": "Pro",
               "total_apps": 2, "total_credits_used": 120,
               "platform_signup_date": "2026-01-10T09:00:00Z"}),
        json!({"Id": 2, "Name": "Lin Chow", "email": "lin@other.io", "plan": "Free",
               "total_apps": 1, "total_credits_used": 40,
               "platform_signup_date": "2026-02-14T09:00:00Z"}),
    ];
    for id in 3..=5 {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        rows.push(json!({"Id": id, "Name": name, "email": email, "plan": "Free",
                         "total_apps": 0, "total_credits_used": 0,
                         "platform_signup_date": "2026-03-01T09:00:00Z"}));
    }
    rows
}

pub fn app_rows() -> Vec<Value> {
    vec![
        json!({"Id": 7, "app_name": "Shop", "app_category": "Retail", "is_db_connected": true,
               "total_messages": 52, "last_chat_analysis_status": "giving_up",
               "sales_status": "No Contacted", "created_at": "2026-03-02T10:00:00Z",
               "user_id": {"Id": 1, "Name": "Ada Byron"}}),
        json!({"Id": 8, "app_name": "Ledger", "app_category": "Finance", "is_db_connected": false,
               "total_messages": 9, "last_chat_analysis_status": "smooth_progress",
               "created_at": "2026-03-05T10:00:00Z", "user_id": 2}),
        json!({"Id": 9, "app_name": "Budget Tracker", "app_category": "Finance",
               "is_db_connected": true, "total_messages": 31,
               "last_chat_analysis_status": "angry", "created_at": "2026-03-09T10:00:00Z",
               "user_id": 1}),
    ]
}

pub fn ai_log_rows() -> Vec<Value> {
    vec![
        json!({"Id": 1, "summary": "Payment form broken", "chat_analysis_status": "angry",
               "sentiment_score": -0.8, "frustration_level": 9, "technical_complexity": 4,
               "created_at": "2026-04-03T08:00:00Z", "app_id": {"Id": 7, "Name": "Shop"}}),
        json!({"Id": 2, "summary": "Ledger export works", "chat_analysis_status": "smooth_progress",
               "sentiment_score": 0.6, "frustration_level": 1, "technical_complexity": 2,
               "created_at": "2026-04-20T08:00:00Z", "app_id": 8}),
        json!({"Id": 3, "summary": "payment retries failing", "chat_analysis_status": "giving_up",
               "sentiment_score": -0.4, "frustration_level": 7, "technical_complexity": 6,
               "created_at": "2026-05-02T08:00:00Z", "app_id": 9}),
    ]
}

pub fn sales_comment_rows() -> Vec<Value> {
    vec![
        json!({"Id": 1, "comment": "Called, no answer", "author_name": "Sam",
               "created_at": "2026-03-03T09:00:00Z", "app_id": 7}),
        json!({"Id": 2, "comment": "Asked for a demo", "author_name": "Sam",
               "created_at": "2026-03-06T09:00:00Z", "app_id": 7}),
        json!({"Id": 3, "comment": "Not interested", "author_name": "Kim",
               "created_at": "2026-03-07T09:00:00Z", "app_id": 8}),
    ]
}

pub fn seeded_client() -> Arc<InMemoryRecordClient> {
    Arc::new(
        InMemoryRecordClient::new()
            .with_table("user_details", user_rows())
            .with_table("app", app_rows())
            .with_table("app_ai_log", ai_log_rows())
            .with_table("sales_comment", sales_comment_rows()),
    )
}

/// Router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub records: Arc<InMemoryRecordClient>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn create_test_app(records: Arc<InMemoryRecordClient>) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::new());
    let state = AppState::new(
        test_config(),
        records.clone() as Arc<dyn RecordClient>,
        notifier.clone() as Arc<dyn Notifier>,
    );
    TestApp {
        router: create_router(state),
        records,
        notifier,
    }
}

pub fn seeded_app() -> TestApp {
    create_test_app(seeded_client())
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
