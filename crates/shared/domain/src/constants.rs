//! Domain-level constants.
//!
//! These constants define the paging defaults shared by every list query.

// =============================================================================
// Pagination
// =============================================================================

/// Default number of rows per page when the request leaves `limit` at zero
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Sort applied when the request carries no `order_by` entry
pub const DEFAULT_ORDER_BY: &str = "id desc";

// =============================================================================
// Search operators (query-string values of `condition`)
// =============================================================================

pub const OP_LESS_THAN: &str = "lt";
pub const OP_LESS_THAN_OR_EQUAL: &str = "lte";
pub const OP_GREATER_THAN: &str = "gt";
pub const OP_GREATER_THAN_OR_EQUAL: &str = "gte";
pub const OP_NOT_EQUAL: &str = "ne";
pub const OP_NOT_NULL: &str = "nn";
pub const OP_NULL: &str = "n";
pub const OP_CONTAINS: &str = "c";

/// Separator joining full-text tokens (`to_tsquery` AND operator)
pub const FULL_TEXT_AND: &str = " & ";
