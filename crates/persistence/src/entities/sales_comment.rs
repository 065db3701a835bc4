//! Sales comment entity (record API row mapping).

use chrono::{DateTime, Utc};
use domain::models::{RecordRef, SalesComment};
use serde::Deserialize;

use super::{record_id, text, timestamp};

pub const TABLE: &str = "sales_comment";

pub const FIELDS: &[&str] = &[
    "comment",
    "sales_status",
    "author_name",
    "author_avatar",
    "created_at",
    "updated_at",
    "app_id",
];

/// Record API row of the `sales_comment` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesCommentEntity {
    #[serde(rename = "Id", deserialize_with = "record_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "text")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub sales_status: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub author_avatar: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub app_id: Option<RecordRef>,
}

impl From<SalesCommentEntity> for SalesComment {
    fn from(entity: SalesCommentEntity) -> Self {
        Self {
            id: entity.id,
            comment: entity.comment.unwrap_or_default(),
            sales_status: entity.sales_status,
            author_name: entity.author_name,
            author_avatar: entity.author_avatar,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            app_id: entity.app_id,
        }
    }
}
