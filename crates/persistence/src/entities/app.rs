//! App entity (record API row mapping).

use chrono::{DateTime, Utc};
use domain::models::{App, ChatAnalysisStatus, RecordRef};
use domain::query::{FilterKind, FilterSpec, SortDirection, TableSpec};
use serde::Deserialize;

use super::{flag, integer, record_id, text, timestamp};

pub const TABLE: &str = "app";

pub const FIELDS: &[&str] = &[
    "Name",
    "app_name",
    "app_category",
    "is_db_connected",
    "canvas_app_id",
    "total_messages",
    "last_message_at",
    "last_chat_analysis_status",
    "last_ai_scan_date",
    "created_at",
    "sales_status",
    "user_id",
];

/// Apps overview table.
pub const SPEC: TableSpec = TableSpec {
    table: TABLE,
    fields: FIELDS,
    search_fields: &["app_name", "app_category"],
    date_field: Some("created_at"),
    default_sort: ("created_at", SortDirection::Desc),
    filters: &[
        FilterSpec {
            key: "category",
            field: "app_category",
            kind: FilterKind::Text,
        },
        FilterSpec {
            key: "status",
            field: "last_chat_analysis_status",
            kind: FilterKind::Text,
        },
        FilterSpec {
            key: "db",
            field: "is_db_connected",
            kind: FilterKind::Flag,
        },
        FilterSpec {
            key: "sales_status",
            field: "sales_status",
            kind: FilterKind::Text,
        },
        FilterSpec {
            key: "user_id",
            field: "user_id",
            kind: FilterKind::Integer,
        },
    ],
    sortable: &[
        "app_name",
        "app_category",
        "total_messages",
        "last_message_at",
        "last_chat_analysis_status",
        "created_at",
        "sales_status",
    ],
};

/// Record API row of the `app` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AppEntity {
    #[serde(rename = "Id", deserialize_with = "record_id")]
    pub id: i64,
    #[serde(rename = "Name", default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub app_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub app_category: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_db_connected: bool,
    #[serde(default, deserialize_with = "text")]
    pub canvas_app_id: Option<String>,
    #[serde(default, deserialize_with = "integer")]
    pub total_messages: i64,
    #[serde(default, deserialize_with = "timestamp")]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "text")]
    pub last_chat_analysis_status: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub last_ai_scan_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "text")]
    pub sales_status: Option<String>,
    #[serde(default)]
    pub user_id: Option<RecordRef>,
}

impl From<AppEntity> for App {
    fn from(entity: AppEntity) -> Self {
        Self {
            id: entity.id,
            app_name: entity.app_name.or(entity.name).unwrap_or_default(),
            app_category: entity.app_category,
            is_db_connected: entity.is_db_connected,
            canvas_app_id: entity.canvas_app_id,
            total_messages: entity.total_messages,
            last_message_at: entity.last_message_at,
            last_chat_analysis_status: entity
                .last_chat_analysis_status
                .map(ChatAnalysisStatus),
            last_ai_scan_date: entity.last_ai_scan_date,
            created_at: entity.created_at,
            sales_status: entity.sales_status,
            user_id: entity.user_id,
        }
    }
}
