//! Pagination envelope and offset arithmetic.

use serde::{Deserialize, Serialize};

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult<T> {
    /// Echo of the requested page (`-1` when pagination was disabled).
    pub page: i64,
    /// Echo of the requested page size (`-1` when pagination was disabled).
    pub page_size: i64,
    /// Rows matching the filters, ignoring offset and limit.
    pub total: i64,
    pub items: Vec<T>,
}

/// Row offset of a 1-based `page`. Never negative.
pub fn calculate_offset(page: i64, page_size: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(page_size).max(0)
}
