//! User routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{App, UserDetails, UserDetailsFields};
use persistence::pages::UsersPageSource;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::list::{build_query, load_page, ListParams, ListResponse};
use crate::app::AppState;
use crate::error::ApiError;

/// Query parameters for the users list.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListUsersQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<u32>,
    #[validate(length(max = 200, message = "search must be at most 200 characters"))]
    pub search: Option<String>,
    pub plan: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    pub user: UserDetails,
    pub apps: Vec<App>,
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListResponse<UserDetails>>, ApiError> {
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
        &[("plan", query.plan.as_deref())],
        None,
    )?;

    let source = UsersPageSource::new(state.records.clone(), state.notifier.clone());
    Ok(Json(load_page(source, paged).await?))
}

/// GET /api/v1/users/:id
///
/// The user and the apps they own, fetched concurrently.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDetailResponse>, ApiError> {
    let users = state.users();
    let apps = state.apps();
    let (user, apps) = tokio::join!(users.get_by_id(id.as_str()), apps.list_by_user(id.as_str()));

    let user = user.ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;
    info!(user_id = user.id, apps = apps.len(), "Fetched user detail");

    Ok(Json(UserDetailResponse { user, apps }))
}

/// PUT /api/v1/users/:id
///
/// User details are managed by the platform; this always answers 403.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<UserDetailsFields>,
) -> Result<Json<UserDetails>, ApiError> {
    let user = state.users().update(id.as_str(), &fields).await?;
    Ok(Json(user))
}
