// --- File: crates/bookify_common/src/logging.rs ---
//! Logging utilities for the Bookify application.
//!
//! Standardized tracing setup used by the backend binary and by tests that
//! want log output.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default log level (INFO).
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` still wins for foreign crates; the `bookify` directive is
/// pinned to `level`. Uses `try_init` so a second call (e.g. from another
/// test) is harmless.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("bookify={}", level).parse().expect("valid directive"));

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
