//! AI analysis log routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use domain::models::{AiLog, AiLogListItem, ScoreScale, StatusCategory};
use domain::query::{DateRange, DateRangeMode};
use persistence::pages::AiLogsPageSource;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::list::{build_query, load_page, ListParams, ListResponse};
use crate::app::AppState;
use crate::error::ApiError;

/// Query parameters for the AI logs list.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListAiLogsQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<u32>,
    #[validate(length(max = 200, message = "search must be at most 200 characters"))]
    pub search: Option<String>,
    pub status: Option<String>,
    pub app_id: Option<String>,
    pub date_mode: Option<DateRangeMode>,
    /// Months back from the current month, for `date_mode=month`.
    #[validate(range(max = 11, message = "month must be between 0 and 11"))]
    pub month: Option<u32>,
    /// Weeks back from the current week, for `date_mode=week`.
    #[validate(range(max = 11, message = "week must be between 0 and 11"))]
    pub week: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListAiLogsQuery {
    /// The date range the parameters select, relative to `today`.
    ///
    /// Bare `from`/`to` without a mode are treated as a custom range.
    pub fn date_range(&self, today: NaiveDate) -> Result<Option<DateRange>, ApiError> {
        let mode = match self.date_mode {
            Some(mode) => mode,
            None if self.from.is_some() || self.to.is_some() => DateRangeMode::Custom,
            None => return Ok(None),
        };

        let range = match mode {
            DateRangeMode::Custom => DateRange::custom(self.from, self.to)?,
            DateRangeMode::Month => DateRange::month(self.month.unwrap_or(0), today)?,
            DateRangeMode::Week => DateRange::week(self.week.unwrap_or(0), today)?,
        };
        Ok(Some(range))
    }
}

#[derive(Debug, Serialize)]
pub struct AiLogDetailResponse {
    #[serde(flatten)]
    pub log: AiLog,
    pub status_category: StatusCategory,
    pub app_name: Option<String>,
    pub score_scale: ScoreScale,
}

/// A page of AI logs together with the ranges their scores are expressed in.
#[derive(Debug, Serialize)]
pub struct AiLogListResponse {
    #[serde(flatten)]
    pub page: ListResponse<AiLogListItem>,
    pub score_scale: ScoreScale,
}

/// GET /api/v1/ai-logs
pub async fn list_ai_logs(
    State(state): State<AppState>,
    Query(query): Query<ListAiLogsQuery>,
) -> Result<Json<AiLogListResponse>, ApiError> {
    query.validate()?;
    let date_range = query.date_range(Utc::now().date_naive())?;

    let paged = build_query(
        state.config.pagination.default_per_page,
        ListParams {
            page: query.page,
            per_page: query.per_page,
            search: query.search.as_deref(),
            sort: query.sort.as_deref(),
            order: query.order.as_deref(),
        },
        &[
            ("status", query.status.as_deref()),
            ("app_id", query.app_id.as_deref()),
        ],
        date_range,
    )?;

    let source = AiLogsPageSource::new(state.records.clone(), state.notifier.clone());
    Ok(Json(AiLogListResponse {
        page: load_page(source, paged).await?,
        score_scale: ScoreScale::default(),
    }))
}

/// GET /api/v1/ai-logs/:id
pub async fn get_ai_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AiLogDetailResponse>, ApiError> {
    let log = state
        .ai_logs()
        .get_by_id(id.as_str())
        .await
        .ok_or_else(|| ApiError::NotFound(format!("AI log {} not found", id)))?;

    let app_name = match &log.app_id {
        Some(app_ref) => match app_ref.name() {
            Some(name) => Some(name.to_string()),
            None => state.apps().get_names(&[app_ref.id()]).await.remove(&app_ref.id()),
        },
        None => None,
    };

    Ok(Json(AiLogDetailResponse {
        status_category: log.status_category(),
        log,
        app_name,
        score_scale: ScoreScale::default(),
    }))
}
