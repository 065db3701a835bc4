//! Sales comment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record_ref::{Identified, RecordRef};

/// A note left by the sales team on an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SalesComment {
    pub id: i64,
    pub comment: String,
    pub sales_status: Option<String>,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub app_id: Option<RecordRef>,
}

impl Identified for SalesComment {
    fn record_id(&self) -> i64 {
        self.id
    }
}

/// Field set for sales comment writes, all of which are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesCommentFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<i64>,
}
