//! Dashboard route.

use axum::{extract::State, Json};
use domain::models::DashboardMetrics;
use persistence::repositories::DashboardRepository;
use tracing::info;

use crate::app::AppState;

/// GET /api/v1/dashboard
///
/// Members that fail show up as zeroes or an empty feed; the endpoint itself
/// does not fail.
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardMetrics> {
    let metrics = DashboardRepository::new(state.records.clone(), state.notifier.clone())
        .get_metrics()
        .await;

    info!(
        total_users = metrics.total_users,
        total_apps = metrics.total_apps,
        critical_issues = metrics.critical_issues,
        "Fetched dashboard metrics"
    );

    Json(metrics)
}
