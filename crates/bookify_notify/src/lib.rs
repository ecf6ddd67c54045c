// --- File: crates/bookify_notify/src/lib.rs ---

// Declare modules within this crate
pub mod error;
pub mod service;

pub use error::NotifyError;
pub use service::{NoopDispatcher, WebhookDispatcher};
