// --- File: crates/bookify_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! This module provides trait definitions for the collaborators the
//! scheduling engine talks to. These traits allow for dependency injection
//! and easier testing by decoupling the engine from specific storage and
//! notification backends.

use crate::models::{Appointment, CustomerContact};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Outcome of a conflict-guarded repository write.
///
/// The availability check and the write happen atomically inside the
/// repository, so a lost race between two bookings surfaces here as
/// `SlotTaken` rather than as a silent double insert.
#[derive(Debug, Clone)]
pub enum GuardedWrite {
    Committed(Appointment),
    /// The write was refused; carries the `Scheduled` appointments whose
    /// intervals intersect the requested window.
    SlotTaken(Vec<Appointment>),
}

/// A trait for appointment persistence.
///
/// The repository owns the appointment records; callers never cache them
/// across operations. `insert`/`update` are unconditional (the `force`
/// path); the `_if_free` variants refuse the write when the target window
/// intersects an existing `Scheduled` appointment.
pub trait AppointmentRepository: Send + Sync {
    /// Error type returned by repository operations.
    type Error: StdError + Send + Sync + 'static;

    fn get(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, Self::Error>;

    fn insert(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, Self::Error>;

    fn insert_if_free(&self, appointment: Appointment) -> BoxFuture<'_, GuardedWrite, Self::Error>;

    fn update(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, Self::Error>;

    /// Conflict-guarded update; the appointment's own id is excluded from
    /// the overlap check so a no-op reschedule is not its own conflict.
    fn update_if_free(&self, appointment: Appointment) -> BoxFuture<'_, GuardedWrite, Self::Error>;

    /// Returns `true` if a record was removed.
    fn delete(&self, id: Uuid) -> BoxFuture<'_, bool, Self::Error>;

    fn find_by_exact_start(
        &self,
        scheduled_at: NaiveDateTime,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error>;

    fn find_by_customer(&self, customer_id: &str) -> BoxFuture<'_, Vec<Appointment>, Self::Error>;

    /// `Scheduled` appointments with `scheduled_at` in
    /// `[from, from + within_days)`, chronologically ordered.
    fn find_upcoming(
        &self,
        from: NaiveDateTime,
        within_days: i64,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error>;

    /// Appointments of any status with `scheduled_at` in `[start, end)`,
    /// chronologically ordered.
    fn find_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error>;
}

/// A trait for the notification side channel.
///
/// Every call is best-effort: the engine catches and logs errors (and
/// `None` results) without ever failing the booking that triggered them.
/// Futures are `'static` so delivery can outlive the triggering request.
pub trait NotificationDispatcher: Send + Sync {
    /// Error type returned by dispatcher operations.
    type Error: StdError + Send + Sync + 'static;

    fn send_confirmation(
        &self,
        appointment: Appointment,
        contact: CustomerContact,
    ) -> BoxFuture<'static, NotificationResult, Self::Error>;

    fn send_update(
        &self,
        appointment: Appointment,
        contact: CustomerContact,
    ) -> BoxFuture<'static, NotificationResult, Self::Error>;

    /// Mirrors the appointment into the external calendar. Returns a link
    /// to the mirrored event when the backend provides one.
    fn create_calendar_event(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'static, Option<String>, Self::Error>;

    fn update_calendar_event(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'static, Option<String>, Self::Error>;

    /// Removes the mirrored event; returns a backend status message.
    fn delete_calendar_event(
        &self,
        appointment_id: Uuid,
    ) -> BoxFuture<'static, String, Self::Error>;
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification.
    pub id: String,
    /// The status of the notification.
    pub status: String,
}
