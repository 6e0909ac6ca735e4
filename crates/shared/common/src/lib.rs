//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Unified error handling
//! - Configuration structures
//! - Tracing setup

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use telemetry::init_tracing;
