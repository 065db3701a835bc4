//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::query::QueryDescriptor;
use serde::Serialize;
use std::time::Instant;

use crate::app::AppState;

/// Table probed to decide whether the record API answers.
const PROBE_TABLE: &str = "user_details";

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub record_api: RecordApiHealth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RecordApiHealth {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn probe_record_api(state: &AppState) -> RecordApiHealth {
    let query = QueryDescriptor::new().fields(["Name"]).page(1, 0);
    let start = Instant::now();
    let result = match state.records.fetch_records(PROBE_TABLE, &query).await {
        Ok(envelope) => envelope.into_page().map(|_| ()).map_err(|e| e.to_string()),
        Err(err) => Err(err.to_string()),
    };
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => RecordApiHealth {
            reachable: true,
            latency_ms: Some(latency_ms),
            error: None,
        },
        Err(error) => {
            tracing::warn!(error = %error, "Record API probe failed");
            RecordApiHealth {
                reachable: false,
                latency_ms: None,
                error: Some(error),
            }
        }
    }
}

/// Full health check, including a record API round trip.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let record_api = probe_record_api(&state).await;
    let status = if record_api.reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if record_api.reachable { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        record_api,
    };

    (status, Json(response))
}

/// Liveness probe. 200 while the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe. 200 once the record API answers.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    if probe_record_api(&state).await.reachable {
        (
            StatusCode::OK,
            Json(StatusResponse {
                status: "ready".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse {
                status: "not_ready".to_string(),
            }),
        )
    }
}
