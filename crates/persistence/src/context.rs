//! Per-call execution context.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use common::{AppError, AppResult};

/// Deadline and log label carried by every repository call.
///
/// The deadline covers every statement the call issues, so a paginated
/// fetch shares one budget between its count and its windowed select.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    deadline: Option<Instant>,
    label: Option<String>,
}

impl QueryContext {
    /// No deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            label: None,
        }
    }

    /// Attach a label that shows up in log lines for this call
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("query")
    }

    /// Whether the deadline has already passed
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| d <= Instant::now())
    }

    /// Drive `fut` under this context's deadline.
    ///
    /// Store errors are converted into [`AppError`]; an elapsed deadline
    /// yields [`AppError::Timeout`] naming `operation`.
    pub async fn run<T, E, F>(&self, operation: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AppError>,
    {
        let Some(deadline) = self.deadline else {
            return fut.await.map_err(Into::into);
        };

        match tokio::time::timeout_at(deadline, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::warn!(label = self.label(), operation, "Deadline exceeded");
                Err(AppError::timeout(operation))
            }
        }
    }
}
