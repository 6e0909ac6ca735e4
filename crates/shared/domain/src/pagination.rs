//! Page metadata returned alongside a paginated fetch.

use serde::{Deserialize, Serialize};

use crate::paging::Paging;

/// Pagination metadata (immutable once built)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Rows matching the filter, ignoring limit and offset
    pub total_records: u64,
    pub total_page: u64,
    pub offset: u64,
    pub limit: u64,
    pub page: u64,
    pub prev_page: u64,
    pub next_page: u64,
}

impl Pagination {
    /// Derive page metadata from a count and a normalized request.
    ///
    /// `prev_page` stays on `page` for the first page, `next_page` stays on
    /// `page` only when `page == total_page`.
    pub fn new(total_records: u64, paging: &Paging) -> Self {
        let total_page = if paging.limit == 0 {
            0
        } else {
            total_records.div_ceil(paging.limit)
        };

        let page = paging.page;
        let prev_page = if page > 1 { page - 1 } else { page };
        let next_page = if page != total_page { page.saturating_add(1) } else { page };

        Self {
            total_records,
            total_page,
            offset: paging.offset(),
            limit: paging.limit,
            page,
            prev_page,
            next_page,
        }
    }

    /// Whether the filter matched no rows
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}
