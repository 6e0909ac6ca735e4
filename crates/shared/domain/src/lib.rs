//! Domain layer - paging requests and page metadata.
//!
//! This crate contains pure request/response types with no infrastructure
//! dependencies. The persistence crate turns these into queries.

pub mod constants;
pub mod error;
pub mod pagination;
pub mod paging;

pub use constants::*;
pub use error::DomainError;
pub use pagination::Pagination;
pub use paging::{NullsOrder, Paging, SearchOperator, SortDirection, SortKey};
