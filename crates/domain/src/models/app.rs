//! App domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record_ref::{Identified, RecordRef, Resolution};
use super::status::{ChatAnalysisStatus, SalesStatus, StatusCategory};
use super::user_details::UserSummary;

/// An app built by a platform user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct App {
    pub id: i64,
    pub app_name: String,
    pub app_category: Option<String>,
    pub is_db_connected: bool,
    pub canvas_app_id: Option<String>,
    pub total_messages: i64,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_chat_analysis_status: Option<ChatAnalysisStatus>,
    pub last_ai_scan_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Raw sales status; values outside [`SalesStatus`] are kept as received.
    pub sales_status: Option<String>,
    /// Owner, pointing at a User Details record.
    pub user_id: Option<RecordRef>,
}

impl App {
    pub fn status_category(&self) -> Option<StatusCategory> {
        self.last_chat_analysis_status.as_ref().map(|s| s.category())
    }

    pub fn is_critical(&self) -> bool {
        self.last_chat_analysis_status
            .as_ref()
            .is_some_and(|s| s.is_critical())
    }

    /// The sales status, if it is one of the known pipeline stages.
    pub fn known_sales_status(&self) -> Option<SalesStatus> {
        self.sales_status.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn owner_id(&self) -> Option<i64> {
        self.user_id.as_ref().map(RecordRef::id)
    }
}

impl Identified for App {
    fn record_id(&self) -> i64 {
        self.id
    }
}

/// Field set for creating or partially updating an app.
///
/// Only the fields that are `Some` are sent to the record API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_db_connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_messages: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chat_analysis_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ai_scan_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_status: Option<SalesStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl AppFields {
    /// The only edit the dashboard ever issues.
    pub fn sales_status(status: SalesStatus) -> Self {
        Self {
            sales_status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// App row of the overview table with its owner's display data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppListItem {
    #[serde(flatten)]
    pub app: App,
    /// `None` when the app has no owner.
    pub owner: Option<Resolution<UserSummary>>,
    pub status_category: Option<StatusCategory>,
}

impl AppListItem {
    /// Wraps an app whose owner has not been looked up yet.
    pub fn pending(app: App) -> Self {
        let owner = app.user_id.as_ref().map(|_| Resolution::Loading);
        let status_category = app.status_category();
        Self {
            app,
            owner,
            status_category,
        }
    }
}

impl Identified for AppListItem {
    fn record_id(&self) -> i64 {
        self.app.id
    }
}
