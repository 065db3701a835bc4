//! AI log entity (record API row mapping).

use chrono::{DateTime, Utc};
use domain::models::{AiLog, ChatAnalysisStatus, RecordRef, ScoreLevel, SentimentScore};
use domain::query::{FilterKind, FilterSpec, SortDirection, TableSpec};
use serde::Deserialize;

use super::{number, record_id, text, timestamp};

pub const TABLE: &str = "app_ai_log";

pub const FIELDS: &[&str] = &[
    "summary",
    "created_at",
    "chat_analysis_status",
    "sentiment_score",
    "frustration_level",
    "technical_complexity",
    "model_used",
    "error_message",
    "app_id",
];

/// AI logs table.
pub const SPEC: TableSpec = TableSpec {
    table: TABLE,
    fields: FIELDS,
    search_fields: &["summary"],
    date_field: Some("created_at"),
    default_sort: ("created_at", SortDirection::Desc),
    filters: &[
        FilterSpec {
            key: "status",
            field: "chat_analysis_status",
            kind: FilterKind::Text,
        },
        FilterSpec {
            key: "app_id",
            field: "app_id",
            kind: FilterKind::Integer,
        },
    ],
    sortable: &[
        "created_at",
        "chat_analysis_status",
        "sentiment_score",
        "frustration_level",
        "technical_complexity",
        "model_used",
    ],
};

/// Record API row of the `app_ai_log` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AiLogEntity {
    #[serde(rename = "Id", deserialize_with = "record_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "text")]
    pub chat_analysis_status: Option<String>,
    #[serde(default, deserialize_with = "number")]
    pub sentiment_score: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub frustration_level: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub technical_complexity: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub model_used: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub app_id: Option<RecordRef>,
}

impl From<AiLogEntity> for AiLog {
    /// Scores are normalized here, so out-of-range values never leave the
    /// persistence layer.
    fn from(entity: AiLogEntity) -> Self {
        Self {
            id: entity.id,
            summary: entity.summary.unwrap_or_default(),
            created_at: entity.created_at,
            chat_analysis_status: entity.chat_analysis_status.map(ChatAnalysisStatus),
            sentiment_score: entity.sentiment_score.and_then(SentimentScore::normalize),
            frustration_level: entity
                .frustration_level
                .and_then(|v| ScoreLevel::normalize("frustration_level", v)),
            technical_complexity: entity
                .technical_complexity
                .and_then(|v| ScoreLevel::normalize("technical_complexity", v)),
            model_used: entity.model_used,
            error_message: entity.error_message,
            app_id: entity.app_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ai_log_scores_are_normalized() {
        let entity: AiLogEntity = serde_json::from_value(json!({
            "Id": 8,
            "summary": "Payment webhook keeps failing",
            "chat_analysis_status": "frustrated",
            "sentiment_score": -3.2,
            "frustration_level": 4.4,
            "technical_complexity": 12,
            "app_id": 14,
            "error_message": null
        }))
        .unwrap();

        let log = AiLog::from(entity);
        assert_eq!(log.sentiment_score.map(|s| s.value()), Some(-1.0));
        assert_eq!(log.frustration_level.map(|l| l.value()), Some(4));
        assert_eq!(log.technical_complexity.map(|l| l.value()), Some(10));
        assert_eq!(log.app_id.map(|r| r.id()), Some(14));
        assert!(log.error_message.is_none());
    }
}
