//! Dashboard metrics repository.
//!
//! Each member is fetched independently; a failed member degrades to zero or
//! an empty list while the others still render.

use std::sync::Arc;

use chrono::Utc;
use domain::models::dashboard::RECENT_LOG_LIMIT;
use domain::models::DashboardMetrics;
use domain::services::{Notifier, RecordClient};

use super::{AiLogRepository, AppRepository, UserDetailsRepository};

/// Aggregates dashboard metrics across the app, user and AI log tables.
#[derive(Clone)]
pub struct DashboardRepository {
    apps: AppRepository,
    users: UserDetailsRepository,
    logs: AiLogRepository,
}

impl DashboardRepository {
    pub fn new(client: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            apps: AppRepository::new(client.clone(), notifier.clone()),
            users: UserDetailsRepository::new(client.clone(), notifier.clone()),
            logs: AiLogRepository::new(client, notifier),
        }
    }

    /// Get complete dashboard metrics.
    pub async fn get_metrics(&self) -> DashboardMetrics {
        let (total_users, total_apps, critical_issues, recent_logs) = tokio::join!(
            self.users.count_all(),
            self.apps.count_all(),
            self.apps.count_critical_issues(),
            self.logs.get_recent(RECENT_LOG_LIMIT),
        );

        tracing::debug!(
            total_users,
            total_apps,
            critical_issues,
            recent_logs = recent_logs.len(),
            "Assembled dashboard metrics"
        );

        DashboardMetrics::assemble(
            total_users,
            total_apps,
            critical_issues,
            &recent_logs,
            Utc::now(),
        )
    }
}
