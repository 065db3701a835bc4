//! Offset-based pagination utilities.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Page sizes offered by the list views.
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Page size used when a request does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum number of numbered pages shown before the window collapses.
const MAX_VISIBLE_PAGES: u32 = 5;

/// Error type for pagination input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Page must be at least 1, got {0}")]
    InvalidPage(u32),
    #[error("Page size must be one of 10, 20, 50 or 100, got {0}")]
    InvalidPageSize(u32),
}

/// Returns true if `per_page` is one of the offered page sizes.
pub fn is_valid_page_size(per_page: u32) -> bool {
    PAGE_SIZE_OPTIONS.contains(&per_page)
}

pub fn check_page(page: u32) -> Result<u32, PaginationError> {
    if page == 0 {
        return Err(PaginationError::InvalidPage(page));
    }
    Ok(page)
}

pub fn check_page_size(per_page: u32) -> Result<u32, PaginationError> {
    if !is_valid_page_size(per_page) {
        return Err(PaginationError::InvalidPageSize(per_page));
    }
    Ok(per_page)
}

/// Computes the row offset for a 1-based page.
///
/// Page 0 is treated as page 1.
pub fn offset_for(page: u32, per_page: u32) -> u32 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// Computes `ceil(total / per_page)`.
///
/// A zero page size or a non-positive total yields zero pages.
pub fn total_pages(total: i64, per_page: u32) -> u32 {
    if per_page == 0 || total <= 0 {
        return 0;
    }
    let per_page = i64::from(per_page);
    let pages = (total + per_page - 1) / per_page;
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One entry of the visible page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(u32),
    Ellipsis,
}

impl Serialize for PageMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageMarker::Page(n) => serializer.serialize_u32(*n),
            PageMarker::Ellipsis => serializer.serialize_str("ellipsis"),
        }
    }
}

/// Builds the page window shown under a table.
///
/// All pages are listed while there are at most five. Beyond that the window
/// keeps the first and last page and collapses the rest around `current`.
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageMarker> {
    use PageMarker::{Ellipsis, Page};

    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let mut window = Vec::with_capacity(7);

    if current <= 3 {
        window.extend((1..=4).map(Page));
        window.push(Ellipsis);
        window.push(Page(total_pages));
    } else if current >= total_pages - 2 {
        window.push(Page(1));
        window.push(Ellipsis);
        window.extend((total_pages - 3..=total_pages).map(Page));
    } else {
        window.push(Page(1));
        window.push(Ellipsis);
        window.extend((current - 1..=current + 1).map(Page));
        window.push(Ellipsis);
        window.push(Page(total_pages));
    }

    window
}

/// Pagination block returned alongside every list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
    pub window: Vec<PageMarker>,
}

impl Pagination {
    /// Describes `page` of a result set with `total` rows.
    ///
    /// A page past the end is reported as-is with `has_next = false`.
    pub fn new(page: u32, per_page: u32, total: i64) -> Self {
        let pages = total_pages(total, per_page);
        Self {
            page,
            per_page,
            total: total.max(0),
            total_pages: pages,
            has_prev: page > 1,
            has_next: page < pages,
            window: page_window(page, pages),
        }
    }
}
