// --- File: crates/bookify_notify/src/error.rs ---

use thiserror::Error;

/// Errors from the webhook notification path. All of them end up logged by
/// the outbox worker; none of them can fail a booking.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway returned status {0}")]
    Gateway(u16),
    #[error("dispatcher endpoint not configured: {0}")]
    NotConfigured(&'static str),
}
