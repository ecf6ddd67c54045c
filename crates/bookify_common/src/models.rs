// --- File: crates/bookify_common/src/models.rs ---
//! Core domain entities shared across the Bookify crates.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of an appointment.
///
/// `Completed` and `Cancelled` are terminal for booking purposes: no
/// reschedule out of either. A reschedule is not a state of its own, it
/// moves `scheduled_at` in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether the state admits no further booking transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booked (or historical) appointment on the single business calendar.
///
/// All times are the business's local wall-clock time; the engine does no
/// timezone conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// Opaque reference to the owning customer; customer records live
    /// outside this engine.
    pub customer_id: String,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    /// Free-form tag, e.g. "consultation" or "phone_call".
    pub appointment_type: String,
    pub notes: Option<String>,
    /// Contact snapshot taken at booking time, used for confirmation and
    /// update notifications. Customer CRUD is an external concern.
    pub contact_email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    pub fn end_time(&self) -> NaiveDateTime {
        self.scheduled_at + Duration::minutes(self.duration_minutes)
    }

    /// True if this appointment's `[scheduled_at, end)` interval intersects
    /// the candidate `[start, start + duration)` window.
    pub fn overlaps(&self, start: NaiveDateTime, duration: Duration) -> bool {
        let candidate_end = start + duration;
        self.scheduled_at < candidate_end && self.end_time() > start
    }

    /// Contact details for the notification path, if any were captured.
    pub fn contact(&self) -> Option<CustomerContact> {
        self.contact_email.as_ref().map(|email| CustomerContact {
            email: email.clone(),
        })
    }
}

/// Where confirmation/update notifications go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerContact {
    pub email: String,
}
