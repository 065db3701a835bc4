//! AI chat analysis log model and score normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::record_ref::{Identified, RecordRef, Resolution};
use super::status::{ChatAnalysisStatus, StatusCategory};

/// Sentiment above this is positive, below its negation negative.
pub const SENTIMENT_THRESHOLD: f64 = 0.3;

/// Upper bound of the frustration and technical complexity scale.
pub const LEVEL_MAX: u8 = 10;

/// Sentiment of a chat, normalized to `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentScore(f64);

impl SentimentScore {
    /// Clamps a raw score into range, logging values that were out of it.
    pub fn normalize(raw: f64) -> Option<Self> {
        if raw.is_nan() {
            warn!(raw, "Discarding NaN sentiment score");
            return None;
        }
        let clamped = raw.clamp(-1.0, 1.0);
        if clamped != raw {
            warn!(raw, clamped, "Sentiment score out of range, clamped");
        }
        Some(SentimentScore(clamped))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn label(&self) -> SentimentLabel {
        if self.0 > SENTIMENT_THRESHOLD {
            SentimentLabel::Positive
        } else if self.0 < -SENTIMENT_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// A 0 to 10 level such as frustration or technical complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreLevel(u8);

impl ScoreLevel {
    /// Rounds and clamps a raw level, logging values that were out of range.
    pub fn normalize(field: &'static str, raw: f64) -> Option<Self> {
        if raw.is_nan() {
            warn!(field, raw, "Discarding NaN score level");
            return None;
        }
        let clamped = raw.round().clamp(0.0, f64::from(LEVEL_MAX));
        if clamped != raw.round() {
            warn!(field, raw, clamped, "Score level out of range, clamped");
        }
        Some(ScoreLevel(clamped as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// The ranges every score in a response is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreScale {
    pub sentiment_min: f64,
    pub sentiment_max: f64,
    pub level_min: u8,
    pub level_max: u8,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self {
            sentiment_min: -1.0,
            sentiment_max: 1.0,
            level_min: 0,
            level_max: LEVEL_MAX,
        }
    }
}

/// Result of one AI analysis of an app's chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AiLog {
    pub id: i64,
    pub summary: String,
    pub created_at: Option<DateTime<Utc>>,
    pub chat_analysis_status: Option<ChatAnalysisStatus>,
    pub sentiment_score: Option<SentimentScore>,
    pub frustration_level: Option<ScoreLevel>,
    pub technical_complexity: Option<ScoreLevel>,
    pub model_used: Option<String>,
    pub error_message: Option<String>,
    pub app_id: Option<RecordRef>,
}

impl AiLog {
    pub fn status_category(&self) -> StatusCategory {
        self.chat_analysis_status
            .as_ref()
            .map(|s| s.category())
            .unwrap_or(StatusCategory::Neutral)
    }

    pub fn sentiment_label(&self) -> Option<SentimentLabel> {
        self.sentiment_score.map(|s| s.label())
    }
}

impl Identified for AiLog {
    fn record_id(&self) -> i64 {
        self.id
    }
}

/// AI log row with the analysed app's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiLogListItem {
    #[serde(flatten)]
    pub log: AiLog,
    pub app_name: Option<Resolution<String>>,
    pub status_category: StatusCategory,
    pub sentiment_label: Option<SentimentLabel>,
}

impl AiLogListItem {
    pub fn pending(log: AiLog) -> Self {
        let app_name = log.app_id.as_ref().map(|r| match r.name() {
            Some(name) => Resolution::Resolved(name.to_string()),
            None => Resolution::Loading,
        });
        Self {
            status_category: log.status_category(),
            sentiment_label: log.sentiment_label(),
            app_name,
            log,
        }
    }
}

impl Identified for AiLogListItem {
    fn record_id(&self) -> i64 {
        self.log.id
    }
}

/// Field set for AI log writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiLogFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_analysis_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frustration_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_complexity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<i64>,
}
