//! App overview and sales routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    App, AppListItem, SalesComment, SalesCommentFields, SalesStatus, StatusCategory, UserDetails,
};
use persistence::pages::AppsPageSource;
use serde::{Deserialize, Serialize};
use shared::validation::parse_record_id;
use tracing::{info, warn};
use validator::Validate;

use super::list::{build_query, load_page, ListParams, ListResponse};
use crate::app::AppState;
use crate::error::ApiError;

/// Query parameters for the apps overview.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListAppsQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<u32>,
    /// Matches owner emails first, then app name and category.
    #[validate(length(max = 200, message = "search must be at most 200 characters"))]
    pub search: Option<String>,
    pub category: Option<String>,
    /// Last chat analysis status.
    pub status: Option<String>,
    /// `connected` or `disconnected`.
    pub db: Option<String>,
    pub sales_status: Option<String>,
    pub user_id: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppDetailResponse {
    pub app: App,
    pub status_category: Option<StatusCategory>,
    pub owner: Option<UserDetails>,
    pub sales_comments: Vec<SalesComment>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSalesStatusRequest {
    #[validate(length(min = 1, message = "sales_status is required"))]
    pub sales_status: String,
}

/// GET /api/v1/apps
pub async fn list_apps(
    State(state): State<AppState>,
    Query(query): Query<ListAppsQuery>,
) -> Result<Json<ListResponse<AppListItem>>, ApiError> {
    query.validate()?;

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
            ("category", query.category.as_deref()),
            ("status", query.status.as_deref()),
            ("db", query.db.as_deref()),
            ("sales_status", query.sales_status.as_deref()),
            ("user_id", query.user_id.as_deref()),
        ],
        None,
    )?;

    let source = AppsPageSource::new(state.records.clone(), state.notifier.clone());
    Ok(Json(load_page(source, paged).await?))
}

/// GET /api/v1/apps/:id
///
/// Owner and sales comments are loaded concurrently once the app is known.
pub async fn get_app(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AppDetailResponse>, ApiError> {
    let app = state
        .apps()
        .get_by_id(id.as_str())
        .await
        .ok_or_else(|| ApiError::NotFound(format!("App {} not found", id)))?;

    let owner_id = app.owner_id();
    let users = state.users();
    let comments = state.sales_comments();
    let (owner, sales_comments) = tokio::join!(
        users.get_by_id(&owner_id),
        comments.get_by_app_id(&app.id)
    );

    if owner_id.is_some() && owner.is_none() {
        warn!(app_id = app.id, "App owner could not be loaded");
    }

    Ok(Json(AppDetailResponse {
        status_category: app.status_category(),
        app,
        owner,
        sales_comments,
    }))
}

/// PATCH /api/v1/apps/:id/sales-status
///
/// Answers with the record the record API confirmed. Nothing is reported as
/// changed until then.
pub async fn update_sales_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSalesStatusRequest>,
) -> Result<Json<App>, ApiError> {
    request.validate()?;

    let status: SalesStatus = request.sales_status.parse().map_err(ApiError::Validation)?;
    let app = state.apps().update_sales_status(id.as_str(), status).await?;

    info!(app_id = app.id, sales_status = %status, "Sales status updated");
    Ok(Json(app))
}

/// GET /api/v1/apps/:id/sales-comments
pub async fn list_sales_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SalesComment>>, ApiError> {
    if parse_record_id(&id).is_none() {
        return Err(ApiError::NotFound(format!("App {} not found", id)));
    }
    Ok(Json(state.sales_comments().get_by_app_id(id.as_str()).await))
}

/// POST /api/v1/apps/:id/sales-comments
///
/// Sales comments are read-only here; this always answers 403.
pub async fn create_sales_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut fields): Json<SalesCommentFields>,
) -> Result<(StatusCode, Json<Vec<SalesComment>>), ApiError> {
    fields.app_id = parse_record_id(&id);
    let created = state
        .sales_comments()
        .create(vec![fields])
        .await?
        .into_complete()?;
    Ok((StatusCode::CREATED, Json(created)))
}
