// --- File: crates/bookify_scheduling/src/conflict.rs ---
//! Read-only conflict detection against the appointment store.

use crate::error::SchedulingError;
use bookify_common::{Appointment, AppointmentRepository, AppointmentStatus, BoxedError};
use chrono::{Duration, NaiveDateTime};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Answers whether a candidate window is free. Never mutates state; the
/// authoritative (atomic) check lives in the repository's guarded writes,
/// this one serves searches and alternative scans.
#[derive(Clone)]
pub struct ConflictChecker {
    repository: Arc<dyn AppointmentRepository<Error = BoxedError>>,
}

impl ConflictChecker {
    pub fn new(repository: Arc<dyn AppointmentRepository<Error = BoxedError>>) -> Self {
        ConflictChecker { repository }
    }

    /// `Scheduled` appointments whose `[start, end)` intervals intersect
    /// the candidate window. `exclude` drops one id from consideration so
    /// a reschedule does not collide with itself.
    pub async fn overlapping(
        &self,
        start: NaiveDateTime,
        duration: Duration,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        // Appointments run minutes-to-hours; a day of lookbehind is enough
        // to catch anything still in progress at `start`.
        let window_start = start - Duration::hours(24);
        let window_end = start + duration;
        let in_range = self
            .repository
            .find_by_date_range(window_start, window_end)
            .await?;

        let clashes: Vec<Appointment> = in_range
            .into_iter()
            .filter(|appointment| {
                appointment.status == AppointmentStatus::Scheduled
                    && Some(appointment.id) != exclude
                    && appointment.overlaps(start, duration)
            })
            .collect();

        if !clashes.is_empty() {
            debug!(
                start = %start,
                clashes = clashes.len(),
                "candidate window intersects booked appointments"
            );
        }
        Ok(clashes)
    }

    pub async fn is_slot_free(
        &self,
        start: NaiveDateTime,
        duration: Duration,
    ) -> Result<bool, SchedulingError> {
        Ok(self.overlapping(start, duration, None).await?.is_empty())
    }
}
