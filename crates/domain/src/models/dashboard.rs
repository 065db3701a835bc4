//! Dashboard metrics domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ai_log::AiLog;
use super::status::{ChatAnalysisStatus, StatusCategory, StatusDistribution};

/// Number of recent AI logs the dashboard fetches.
pub const RECENT_LOG_LIMIT: u32 = 20;

/// Number of recent logs shown in the activity feed.
pub const ACTIVITY_FEED_LIMIT: usize = 6;

/// One entry of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityItem {
    pub id: i64,
    pub summary: String,
    pub status: Option<ChatAnalysisStatus>,
    pub category: StatusCategory,
    pub app_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&AiLog> for ActivityItem {
    fn from(log: &AiLog) -> Self {
        Self {
            id: log.id,
            summary: log.summary.clone(),
            status: log.chat_analysis_status.clone(),
            category: log.status_category(),
            app_id: log.app_id.as_ref().map(|r| r.id()),
            created_at: log.created_at,
        }
    }
}

/// Complete dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardMetrics {
    pub total_users: i64,
    pub total_apps: i64,
    pub critical_issues: i64,
    pub recent_activity: Vec<ActivityItem>,
    pub status_distribution: StatusDistribution,
    pub generated_at: DateTime<Utc>,
}

impl DashboardMetrics {
    /// Builds the payload from the independently fetched members.
    ///
    /// The distribution covers every recent log; the feed only the newest.
    pub fn assemble(
        total_users: i64,
        total_apps: i64,
        critical_issues: i64,
        recent_logs: &[AiLog],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let status_distribution = StatusDistribution::from_statuses(
            recent_logs
                .iter()
                .filter_map(|log| log.chat_analysis_status.as_ref()),
        );
        let recent_activity = recent_logs
            .iter()
            .take(ACTIVITY_FEED_LIMIT)
            .map(ActivityItem::from)
            .collect();

        Self {
            total_users,
            total_apps,
            critical_issues,
            recent_activity,
            status_distribution,
            generated_at,
        }
    }
}
