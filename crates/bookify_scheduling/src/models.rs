// --- File: crates/bookify_scheduling/src/models.rs ---
//! Request/response types for the REST surface.

use crate::ranking::RankedSlot;
use bookify_common::Appointment;
use serde::{Deserialize, Serialize};

/// Local wall-clock timestamps on the wire, ISO 8601 without offset.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Target date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-02-17"))]
    pub date: String,

    /// Appointment duration in minutes; falls back to the configured default
    #[cfg_attr(feature = "openapi", schema(example = 30))]
    pub duration_minutes: Option<i64>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableSlotsResponse {
    pub slots: Vec<RankedSlot>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookAppointmentRequest {
    #[cfg_attr(feature = "openapi", schema(example = "7"))]
    pub customer_id: String,
    /// Start time, ISO 8601 local time
    #[cfg_attr(feature = "openapi", schema(example = "2025-02-17T14:00:00"))]
    pub scheduled_at: String,
    #[cfg_attr(feature = "openapi", schema(example = 30))]
    pub duration_minutes: Option<i64>,
    #[cfg_attr(feature = "openapi", schema(example = "consultation"))]
    pub appointment_type: Option<String>,
    pub notes: Option<String>,
    pub contact_email: Option<String>,
    /// Administrative override: book even if the slot is taken
    #[serde(default)]
    pub force: bool,
    /// Why the override was used; logged for auditing
    pub override_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RescheduleRequest {
    /// New start time, ISO 8601 local time
    #[cfg_attr(feature = "openapi", schema(example = "2025-02-18T10:00:00"))]
    pub scheduled_at: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct UpcomingQuery {
    /// Window size in days, default 7
    #[cfg_attr(feature = "openapi", schema(example = 7))]
    pub days: Option<i64>,
}

/// Wire representation of an appointment.
#[derive(Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentView {
    pub id: String,
    pub customer_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-02-17T14:00:00"))]
    pub scheduled_at: String,
    pub duration_minutes: i64,
    #[cfg_attr(feature = "openapi", schema(example = "scheduled"))]
    pub status: String,
    pub appointment_type: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for AppointmentView {
    fn from(appointment: Appointment) -> Self {
        AppointmentView {
            id: appointment.id.to_string(),
            customer_id: appointment.customer_id,
            scheduled_at: appointment.scheduled_at.format(DATETIME_FORMAT).to_string(),
            duration_minutes: appointment.duration_minutes,
            status: appointment.status.to_string(),
            appointment_type: appointment.appointment_type,
            notes: appointment.notes,
            created_at: appointment.created_at.format(DATETIME_FORMAT).to_string(),
            updated_at: appointment.updated_at.format(DATETIME_FORMAT).to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingResponse {
    pub success: bool,
    pub appointment: AppointmentView,
    pub message: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancellationResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentView>,
}

/// Error body for every non-2xx response. Conflicts carry the requested
/// time plus ranked alternatives suitable for direct presentation.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-02-17T14:00:00"))]
    pub requested: Option<String>,
    pub alternatives: Vec<RankedSlot>,
}
