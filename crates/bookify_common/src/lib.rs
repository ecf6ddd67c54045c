// --- File: crates/bookify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod models; // Shared domain entities
pub mod services; // Service abstractions

// Re-export the pieces most crates want without the module path
pub use error::HttpStatusCode;
pub use models::{Appointment, AppointmentStatus, CustomerContact};
pub use services::{
    AppointmentRepository, BoxFuture, BoxedError, GuardedWrite, NotificationDispatcher,
    NotificationResult,
};
