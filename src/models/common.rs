//! Shared pagination types

use serde::{Deserialize, Serialize};

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
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
            per_page: 20,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters, clamping to sane bounds.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        // Widen before multiplying; page comes straight from the query string
        (self.page.saturating_sub(1)) as i64 * self.per_page as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
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
    /// Create a new paginated result
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
        if self.per_page == 0 {
            return 0;
        }
        let per_page = self.per_page as i64;
        let pages = (self.total + per_page - 1) / per_page;
        pages.clamp(0, u32::MAX as i64) as u32
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Map the items to another type, keeping pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_list_params_clamps_page_and_per_page() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);

        let params = ListParams::new(3, 0);
        assert_eq!(params.page, 3);
        assert_eq!(params.per_page, 1);
    }

    #[test]
    fn test_offset_and_limit() {
        let params = ListParams::new(3, 20);
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_total_pages() {
        let params = ListParams::new(1, 10);
        let result = PagedResult::new(vec![1, 2, 3], 25, &params);
        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
        assert!(!result.has_prev());
    }

    #[test]
    fn test_offset_at_page_boundary() {
        let params = ListParams::new(u32::MAX, 100);
        assert_eq!(params.offset(), (u32::MAX as i64 - 1) * 100);
    }

    #[test]
    fn test_total_pages_with_large_totals() {
        let params = ListParams::new(1, 100);
        let result: PagedResult<i64> = PagedResult::new(vec![], 5_000_000_000, &params);
        assert_eq!(result.total_pages(), 50_000_000);
    }

    proptest! {
        #[test]
        fn prop_offset_never_negative(page in proptest::num::u32::ANY, per_page in 0u32..1_000) {
            let params = ListParams::new(page, per_page);
            prop_assert!(params.offset() >= 0);
            prop_assert!(params.limit() >= 1);
            prop_assert!(params.limit() <= 100);
        }
    }
}
