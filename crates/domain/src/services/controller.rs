//! Generic list page controller.
//!
//! One controller drives every list page; the page-specific part is the
//! [`PagedSource`] that turns query state into rows.

use async_trait::async_trait;
use std::future::Future;
use tracing::debug;

use shared::pagination::{total_pages, Pagination};

use crate::error::ServiceError;
use crate::models::Identified;
use crate::query::{DateRange, PagedQuery, SortDirection};

/// One page of rows with the authoritative total.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Produces rows for a list page.
#[async_trait]
pub trait PagedSource: Send + Sync {
    type Row: Send;

    async fn fetch_page(&self, query: &PagedQuery) -> Result<Page<Self::Row>, ServiceError>;
}

/// Identifies one issued fetch. Only the newest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Query state plus the last committed page.
pub struct PageController<S: PagedSource> {
    source: S,
    query: PagedQuery,
    rows: Vec<S::Row>,
    total: i64,
    error: Option<ServiceError>,
    generation: u64,
    stale: bool,
}

impl<S: PagedSource> PageController<S> {
    pub fn new(source: S, query: PagedQuery) -> Self {
        Self {
            source,
            query,
            rows: Vec::new(),
            total: 0,
            error: None,
            generation: 0,
            stale: true,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn query(&self) -> &PagedQuery {
        &self.query
    }

    pub fn rows(&self) -> &[S::Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<S::Row> {
        self.rows
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.query.per_page())
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.query.page(), self.query.per_page(), self.total)
    }

    /// Error of the last committed fetch, if it failed.
    pub fn error(&self) -> Option<&ServiceError> {
        self.error.as_ref()
    }

    /// Whether the state changed since the last committed fetch.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn set_search(&mut self, term: &str) -> Result<(), ServiceError> {
        self.query.set_search(term)?;
        self.stale = true;
        Ok(())
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        self.query.set_filter(key, value);
        self.stale = true;
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.query.set_date_range(range);
        self.stale = true;
    }

    pub fn set_sort(&mut self, column: &str) {
        self.query.set_sort(column);
        self.stale = true;
    }

    pub fn set_sort_explicit(&mut self, column: &str, direction: SortDirection) {
        self.query.set_sort_explicit(column, direction);
        self.stale = true;
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ServiceError> {
        self.query.set_page(page)?;
        self.stale = true;
        Ok(())
    }

    pub fn set_page_size(&mut self, per_page: u32) -> Result<(), ServiceError> {
        self.query.set_page_size(per_page)?;
        self.stale = true;
        Ok(())
    }

    /// Issues a ticket for a new fetch, superseding every earlier one.
    pub fn begin_fetch(&mut self) -> (FetchTicket, PagedQuery) {
        self.generation += 1;
        (
            FetchTicket {
                generation: self.generation,
            },
            self.query.clone(),
        )
    }

    /// Applies a fetch result if its ticket is still the newest.
    ///
    /// A failure is recorded and the previous rows are kept.
    pub fn commit(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<S::Row>, ServiceError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                latest = self.generation,
                "Discarding superseded page fetch"
            );
            return false;
        }

        match result {
            Ok(page) => {
                self.rows = page.rows;
                self.total = page.total;
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err);
            }
        }
        self.stale = false;
        true
    }

    /// Fetches the current page and commits the result.
    pub async fn fetch(&mut self) -> Result<(), ServiceError> {
        let (ticket, query) = self.begin_fetch();
        let result = self.source.fetch_page(&query).await;
        self.commit(ticket, result);
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Re-runs the fetch with unchanged state.
    pub async fn retry(&mut self) -> Result<(), ServiceError> {
        self.fetch().await
    }
}

impl<S> PageController<S>
where
    S: PagedSource,
    S::Row: Identified + Clone,
{
    /// Runs a remote write and, once it is confirmed, replaces the matching
    /// row with the record the write returned.
    ///
    /// On failure the rows are left untouched.
    ///
    /// For consumers that keep a controller alive across edits, such as the
    /// apps page editing a sales status in place. The HTTP route holds no
    /// page state and answers with the confirmed record directly.
    pub async fn apply_confirmed_write<F>(&mut self, id: i64, write: F) -> Result<S::Row, ServiceError>
    where
        F: Future<Output = Result<S::Row, ServiceError>>,
    {
        let updated = write.await?;
        if let Some(row) = self.rows.iter_mut().find(|r| r.record_id() == id) {
            *row = updated.clone();
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        label: String,
    }

    impl Identified for Row {
        fn record_id(&self) -> i64 {
            self.id
        }
    }

    /// Serves `total` numbered rows, or fails while `failing` is set.
    struct NumberSource {
        total: i64,
        failing: Mutex<bool>,
        calls: AtomicUsize,
    }

    impl NumberSource {
        fn new(total: i64) -> Self {
            Self {
                total,
                failing: Mutex::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    #[async_trait]
    impl PagedSource for NumberSource {
        type Row = Row;

        async fn fetch_page(&self, query: &PagedQuery) -> Result<Page<Row>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.failing.lock().unwrap() {
                return Err(ServiceError::Network("connection refused".to_string()));
            }
            let paging = query.paging();
            let start = i64::from(paging.offset) + 1;
            let end = (start + i64::from(paging.limit) - 1).min(self.total);
            Ok(Page {
                rows: (start..=end)
                    .map(|id| Row {
                        id,
                        label: format!("row {}", id),
                    })
                    .collect(),
                total: self.total,
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_commits_rows_and_total() {
        let mut controller = PageController::new(NumberSource::new(45), PagedQuery::new(20));
        controller.set_page(2).unwrap();
        controller.fetch().await.unwrap();

        assert_eq!(controller.rows().len(), 20);
        assert_eq!(controller.rows()[0].id, 21);
        assert_eq!(controller.total(), 45);
        assert_eq!(controller.total_pages(), 3);
        assert!(!controller.is_stale());
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let mut controller = PageController::new(NumberSource::new(45), PagedQuery::new(20));
        controller.set_page(7).unwrap();
        controller.fetch().await.unwrap();

        assert!(controller.rows().is_empty());
        let pagination = controller.pagination();
        assert!(!pagination.has_next);
        assert_eq!(pagination.total_pages, 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_rows_and_retry_recovers() {
        let mut controller = PageController::new(NumberSource::new(5), PagedQuery::new(10));
        controller.fetch().await.unwrap();
        assert_eq!(controller.rows().len(), 5);

        controller.source().set_failing(true);
        let err = controller.fetch().await.unwrap_err();
        assert!(matches!(err, ServiceError::Network(_)));
        assert_eq!(controller.rows().len(), 5);
        assert!(controller.error().is_some());

        controller.source().set_failing(false);
        controller.retry().await.unwrap();
        assert!(controller.error().is_none());
        assert_eq!(controller.source().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_superseded_fetch_is_discarded() {
        let mut controller = PageController::new(NumberSource::new(45), PagedQuery::new(20));

        let (first, first_query) = controller.begin_fetch();
        controller.set_page(3).unwrap();
        let (second, second_query) = controller.begin_fetch();

        let second_result = controller.source().fetch_page(&second_query).await;
        assert!(controller.commit(second, second_result));

        let first_result = controller.source().fetch_page(&first_query).await;
        assert!(!controller.commit(first, first_result));

        assert_eq!(controller.rows()[0].id, 41);
    }

    #[tokio::test]
    async fn test_setters_mark_stale() {
        let mut controller = PageController::new(NumberSource::new(5), PagedQuery::new(10));
        controller.fetch().await.unwrap();
        assert!(!controller.is_stale());

        controller.set_filter("status", "stuck");
        assert!(controller.is_stale());
    }

    #[tokio::test]
    async fn test_confirmed_write_replaces_row() {
        let mut controller = PageController::new(NumberSource::new(3), PagedQuery::new(10));
        controller.fetch().await.unwrap();

        let updated = controller
            .apply_confirmed_write(2, async {
                Ok(Row {
                    id: 2,
                    label: "Closed Won".to_string(),
                })
            })
            .await
            .unwrap();

        assert_eq!(updated.label, "Closed Won");
        assert_eq!(controller.rows()[1].label, "Closed Won");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_rows() {
        let mut controller = PageController::new(NumberSource::new(3), PagedQuery::new(10));
        controller.fetch().await.unwrap();

        let result = controller
            .apply_confirmed_write(2, async {
                Err(ServiceError::RemoteRejected("locked".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(controller.rows()[1].label, "row 2");
    }
}
