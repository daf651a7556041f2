//! Pagination types
//!
//! Page numbers are 1-based. A list always has at least one page, so the
//! first page of an empty list is valid while anything past the last page,
//! below 1 or not a number at all is rejected.

use serde::{Deserialize, Serialize};

/// Number of posts shown per list page
pub const PAGINATION: u32 = 10;

/// Resolved pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PAGINATION,
        }
    }
}

impl ListParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Total page count for `total` items, never less than one
pub fn num_pages(total: i64, per_page: u32) -> u32 {
    let per_page = i64::from(per_page.max(1));
    let total = total.max(0);
    let pages = (total + per_page - 1) / per_page;
    u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
}

/// Turn the raw `?page=` value into a page number within `1..=num_pages`.
///
/// A missing value means the first page and `last` means the final one.
/// Returns `None` for anything else that does not name an existing page.
pub fn resolve_page(raw: Option<&str>, total: i64, per_page: u32) -> Option<u32> {
    let pages = num_pages(total, per_page);
    let raw = match raw.map(str::trim) {
        None | Some("") => return Some(1),
        Some(raw) => raw,
    };
    if raw == "last" {
        return Some(pages);
    }
    let page: i64 = raw.parse().ok()?;
    if page < 1 || page > i64::from(pages) {
        return None;
    }
    u32::try_from(page).ok()
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        num_pages(self.total, self.per_page)
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Navigation data for the paginator template
    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            number: self.page,
            num_pages: self.total_pages(),
            total: self.total,
            has_next: self.has_next(),
            has_previous: self.has_prev(),
            next_page_number: self.has_next().then(|| self.page + 1),
            previous_page_number: self.has_prev().then(|| self.page - 1),
        }
    }
}

/// Serializable paginator state handed to templates
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageInfo {
    pub number: u32,
    pub num_pages: u32,
    pub total: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u32>,
    pub previous_page_number: Option<u32>,
}
