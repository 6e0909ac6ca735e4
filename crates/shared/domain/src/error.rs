//! Domain-level errors.
//!
//! These errors represent invalid paging or search requests.
//! They are independent of infrastructure concerns (database, transport).

use thiserror::Error;

/// Domain-specific errors for malformed requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The search operator is not one of the supported values
    #[error("Unknown search operator: {0}")]
    UnknownOperator(String),
}
