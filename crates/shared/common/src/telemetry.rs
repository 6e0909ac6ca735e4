//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing subscriber.
///
/// Verbose mode forces the `debug` level, otherwise `RUST_LOG` is honoured
/// (default `info`). Returns `false` when a global subscriber was already
/// installed, which makes repeated calls harmless.
pub fn init_tracing(verbose: bool) -> bool {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::new(filter))
        .try_init()
        .is_ok()
}
