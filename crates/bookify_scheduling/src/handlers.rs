// File: crates/bookify_scheduling/src/handlers.rs
use crate::error::SchedulingError;
use crate::models::{
    AppointmentView, AppointmentsResponse, AvailabilityQuery, AvailableSlotsResponse,
    BookAppointmentRequest, BookingResponse, CancellationResponse, ErrorBody, RescheduleRequest,
    UpcomingQuery, DATETIME_FORMAT,
};
use crate::ranking::format_slot;
use crate::service::{BookingRequest, SchedulingService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bookify_common::HttpStatusCode;
use bookify_config::AppConfig;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const DEFAULT_UPCOMING_DAYS: i64 = 7;

// Define shared state needed by scheduling handlers
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub service: Arc<SchedulingService>,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

fn error_response(err: SchedulingError) -> HandlerError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match err {
        SchedulingError::SlotConflict {
            requested,
            alternatives,
        } => ErrorBody {
            error: format!(
                "The requested time ({}) is already booked.",
                format_slot(requested)
            ),
            requested: Some(requested.format(DATETIME_FORMAT).to_string()),
            alternatives,
        },
        SchedulingError::Repository(e) => {
            info!("repository failure surfaced to handler: {}", e);
            ErrorBody {
                error: "Internal error while accessing appointments.".to_string(),
                requested: None,
                alternatives: Vec::new(),
            }
        }
        other => ErrorBody {
            error: other.to_string(),
            requested: None,
            alternatives: Vec::new(),
        },
    };
    (status, Json(body))
}

fn validation(message: &str) -> HandlerError {
    error_response(SchedulingError::Validation(message.to_string()))
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, HandlerError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|_| validation("Invalid datetime format (expected YYYY-MM-DDTHH:MM:SS)"))
}

/// Handler to get available time slots for a date.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/scheduling/availability", // Path relative to /api
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots in preference order", body = AvailableSlotsResponse),
        (status = 400, description = "Bad request (e.g., invalid date format)", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    tag = "Scheduling"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailableSlotsResponse>, HandlerError> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| validation("Invalid date format (YYYY-MM-DD)"))?;

    let slots = state
        .service
        .search_available_slots(date, query.duration_minutes)
        .await
        .map_err(error_response)?;
    Ok(Json(AvailableSlotsResponse { slots }))
}

/// Handler to book an appointment.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/scheduling/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 200, description = "Appointment booked", body = BookingResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Slot already booked; alternatives included", body = ErrorBody,
         example = json!({
             "error": "The requested time (Monday, February 17 at 2:00 PM) is already booked.",
             "requested": "2025-02-17T14:00:00",
             "alternatives": [
                 {"start": "2025-02-17T14:30:00", "display": "Monday, February 17 at 2:30 PM"}
             ]
         })
        ),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    tag = "Scheduling"
))]
pub async fn book_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<Json<BookingResponse>, HandlerError> {
    let scheduled_at = parse_datetime(&payload.scheduled_at)?;

    let appointment = state
        .service
        .book(BookingRequest {
            customer_id: payload.customer_id,
            scheduled_at,
            duration_minutes: payload.duration_minutes,
            appointment_type: payload
                .appointment_type
                .unwrap_or_else(|| "consultation".to_string()),
            notes: payload.notes,
            contact_email: payload.contact_email,
            force: payload.force,
            override_reason: payload.override_reason,
        })
        .await
        .map_err(error_response)?;

    Ok(Json(BookingResponse {
        success: true,
        appointment: AppointmentView::from(appointment),
        message: "Appointment booked successfully.".to_string(),
    }))
}

/// Handler to move an appointment to a new time.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/scheduling/appointments/{id}/reschedule",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Appointment rescheduled", body = BookingResponse),
        (status = 404, description = "Appointment not found", body = ErrorBody),
        (status = 409, description = "New slot already booked; alternatives included", body = ErrorBody)
    ),
    tag = "Scheduling"
))]
pub async fn reschedule_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RescheduleRequest>,
) -> Result<Json<BookingResponse>, HandlerError> {
    let new_start = parse_datetime(&payload.scheduled_at)?;

    let appointment = state
        .service
        .reschedule(id, new_start)
        .await
        .map_err(error_response)?;

    Ok(Json(BookingResponse {
        success: true,
        appointment: AppointmentView::from(appointment),
        message: "Appointment rescheduled successfully.".to_string(),
    }))
}

/// Handler to cancel an appointment while keeping its history.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/scheduling/appointments/{id}/cancel",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment cancelled", body = CancellationResponse),
        (status = 404, description = "Appointment not found", body = ErrorBody),
        (status = 409, description = "Appointment already completed or cancelled", body = ErrorBody)
    ),
    tag = "Scheduling"
))]
pub async fn cancel_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationResponse>, HandlerError> {
    state.service.cancel(id).await.map_err(error_response)?;
    Ok(Json(CancellationResponse {
        success: true,
        message: "Appointment cancelled successfully.".to_string(),
    }))
}

/// Handler to mark an appointment as completed.
#[axum::debug_handler]
pub async fn complete_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationResponse>, HandlerError> {
    state.service.complete(id).await.map_err(error_response)?;
    Ok(Json(CancellationResponse {
        success: true,
        message: "Appointment marked as completed.".to_string(),
    }))
}

/// Handler to hard-delete an appointment and its mirrored calendar event.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/scheduling/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment deleted", body = CancellationResponse),
        (status = 404, description = "Appointment not found", body = ErrorBody)
    ),
    tag = "Scheduling"
))]
pub async fn delete_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationResponse>, HandlerError> {
    state.service.delete(id).await.map_err(error_response)?;
    Ok(Json(CancellationResponse {
        success: true,
        message: "Appointment deleted successfully.".to_string(),
    }))
}

/// Handler to list upcoming appointments.
#[axum::debug_handler]
pub async fn upcoming_handler(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<AppointmentsResponse>, HandlerError> {
    let appointments = state
        .service
        .list_upcoming(query.days.unwrap_or(DEFAULT_UPCOMING_DAYS))
        .await
        .map_err(error_response)?;
    Ok(Json(AppointmentsResponse {
        appointments: appointments.into_iter().map(AppointmentView::from).collect(),
    }))
}

/// Handler to list a customer's appointment history.
#[axum::debug_handler]
pub async fn customer_appointments_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(customer_id): Path<String>,
) -> Result<Json<AppointmentsResponse>, HandlerError> {
    let appointments = state
        .service
        .list_for_customer(&customer_id)
        .await
        .map_err(error_response)?;
    Ok(Json(AppointmentsResponse {
        appointments: appointments.into_iter().map(AppointmentView::from).collect(),
    }))
}
