//! Logging setup for Hermod binaries.
//!
//! Initializes a `tracing` subscriber from the configured level. Call sites
//! import the macros through [`prelude`].

use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global tracing subscriber.
///
/// `level` accepts anything `EnvFilter` understands ("info", "debug",
/// "hermod_server=debug,info", ...). Calling init more than once is a no-op,
/// which keeps test binaries from fighting over the global subscriber.
pub fn init(level: &str) -> Result<(), String> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("Failed to set tracing subscriber: {}", e))
}

/// Common imports for instrumented code.
pub mod prelude {
    pub use tracing::{debug, error, info, trace, warn};
}
