//! Shared plumbing for the paged list endpoints.

use domain::error::ServiceError;
use domain::query::{DateRange, PagedQuery, SortDirection};
use domain::services::{PageController, PagedSource};
use serde::Serialize;
use shared::pagination::Pagination;
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::metrics::record_list_fetch_failure;

/// One page of a list endpoint.
///
/// A failed fetch still answers 200: `data` is empty and `error` says what
/// went wrong and whether repeating the request may help.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ListError>,
}

#[derive(Debug, Serialize)]
pub struct ListError {
    pub error: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&ServiceError> for ListError {
    fn from(err: &ServiceError) -> Self {
        let (error, retryable) = match err {
            ServiceError::Network(_) => ("service_unavailable", true),
            ServiceError::RemoteRejected(_) => ("remote_rejected", true),
            ServiceError::PartialFailure { .. } => ("partial_failure", true),
            ServiceError::InvalidInput(_) => ("validation_error", false),
            ServiceError::ReadOnly(_) => ("read_only", false),
        };
        Self {
            error,
            message: err.to_string(),
            retryable,
        }
    }
}

/// Parameters every list endpoint accepts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListParams<'a> {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<&'a str>,
    pub sort: Option<&'a str>,
    pub order: Option<&'a str>,
}

/// Builds the query state for a request.
///
/// Filters, search and date range go first because each of them moves back
/// to page 1; the requested page is applied last.
pub fn build_query(
    default_per_page: u32,
    params: ListParams<'_>,
    filters: &[(&str, Option<&str>)],
    date_range: Option<DateRange>,
) -> Result<PagedQuery, ApiError> {
    let mut query = PagedQuery::new(default_per_page);

    for (key, value) in filters {
        if let Some(value) = value {
            query.set_filter(key, value);
        }
    }
    if let Some(term) = params.search {
        query.set_search(term)?;
    }
    query.set_date_range(date_range);

    if let Some(per_page) = params.per_page {
        query.set_page_size(per_page)?;
    }
    if let Some(page) = params.page {
        query.set_page(page)?;
    }

    match (params.sort, params.order) {
        (Some(column), order) => {
            let direction = match order {
                Some(raw) => SortDirection::parse(raw).ok_or_else(|| {
                    ApiError::Validation(format!("order must be asc or desc, got '{}'", raw))
                })?,
                None => SortDirection::Asc,
            };
            query.set_sort_explicit(column, direction);
        }
        (None, Some(_)) => {
            return Err(ApiError::Validation("order requires sort".to_string()));
        }
        (None, None) => {}
    }

    Ok(query)
}

/// Fetches one page through a [`PageController`].
pub async fn load_page<S>(source: S, query: PagedQuery) -> Result<ListResponse<S::Row>, ApiError>
where
    S: PagedSource,
{
    let mut controller = PageController::new(source, query);
    match controller.fetch().await {
        Ok(()) => Ok(ListResponse {
            pagination: controller.pagination(),
            data: controller.into_rows(),
            error: None,
        }),
        Err(ServiceError::InvalidInput(msg)) => Err(ApiError::Validation(msg)),
        Err(err) => {
            warn!(error = %err, "List fetch failed");
            let list_error = ListError::from(&err);
            record_list_fetch_failure(list_error.error);
            Ok(ListResponse {
                pagination: controller.pagination(),
                data: Vec::new(),
                error: Some(list_error),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_then_page_keeps_requested_page() {
        let query = build_query(
            20,
            ListParams {
                page: Some(3),
                search: Some("crm"),
                ..Default::default()
            },
            &[("category", Some("Finance"))],
            None,
        )
        .unwrap();

        assert_eq!(query.page(), 3);
        assert_eq!(query.search(), "crm");
        assert_eq!(query.filter("category"), Some("Finance"));
    }

    #[test]
    fn test_sort_defaults_to_ascending() {
        let query = build_query(
            20,
            ListParams {
                sort: Some("app_name"),
                ..Default::default()
            },
            &[],
            None,
        )
        .unwrap();
        assert_eq!(query.sort(), Some(("app_name", SortDirection::Asc)));
    }

    #[test]
    fn test_bad_order_rejected() {
        let result = build_query(
            20,
            ListParams {
                sort: Some("app_name"),
                order: Some("sideways"),
                ..Default::default()
            },
            &[],
            None,
        );
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_odd_page_size_rejected() {
        let result = build_query(
            20,
            ListParams {
                per_page: Some(25),
                ..Default::default()
            },
            &[],
            None,
        );
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_empty_filter_values_ignored() {
        let query = build_query(20, ListParams::default(), &[("plan", Some("  "))], None).unwrap();
        assert_eq!(query.filter("plan"), None);
    }

    #[test]
    fn test_list_error_retry_hint() {
        let err = ServiceError::Network("connection refused".into());
        let list_error = ListError::from(&err);
        assert_eq!(list_error.error, "service_unavailable");
        assert!(list_error.retryable);
    }
}
