//! Shared request types for API handlers

use serde::Deserialize;

use crate::models::ListParams;

/// Pagination query string (`?page=2&per_page=50`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Convert to clamped list parameters, filling defaults.
    pub fn params(&self) -> ListParams {
        let defaults = ListParams::default();
        ListParams::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}
