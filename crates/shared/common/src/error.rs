//! Unified error handling for the data-access layer.
//!
//! Every repository and pagination operation returns [`AppResult`]. Store
//! failures keep their source error; [`AppError::user_message`] hides it
//! from callers and logs it instead.

use domain::DomainError;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// A single-row lookup matched nothing
    #[error("Record not found")]
    NotFound,

    /// Missing or malformed arguments (no filter fields, no update fields, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Any other failure reported by the store, including malformed query text
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[source] sea_orm::DbErr),

    /// The caller's deadline elapsed before the store answered
    #[error("Deadline exceeded: {0}")]
    Timeout(String),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Timeout(_) => "DEADLINE_EXCEEDED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) => msg.clone(),

            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }

    /// Whether this is the not-found kind
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound)
    }
}

// =============================================================================
// Store Error Conversion
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(_) => AppError::NotFound,
            other => AppError::Database(other),
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnknownOperator(op) => {
                AppError::InvalidArgument(format!("unknown search operator '{op}'"))
            }
        }
    }
}

/// Serialized as `{ "code": ..., "message": ... }` so it can travel inside
/// response envelopes.
impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("AppError", 2)?;
        body.serialize_field("code", self.code())?;
        body.serialize_field("message", &self.user_message())?;
        body.end()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        AppError::Timeout(operation.into())
    }
}
