// File: crates/bookify_scheduling/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::models::{
    AppointmentView, AppointmentsResponse, AvailabilityQuery, AvailableSlotsResponse,
    BookAppointmentRequest, BookingResponse, CancellationResponse, ErrorBody, RescheduleRequest,
};
use crate::ranking::RankedSlot;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_availability_handler,
        crate::handlers::book_appointment_handler,
        crate::handlers::reschedule_handler,
        crate::handlers::cancel_handler,
        crate::handlers::delete_appointment_handler,
    ),
    components(schemas(
        AvailabilityQuery,
        AvailableSlotsResponse,
        BookAppointmentRequest,
        RescheduleRequest,
        AppointmentView,
        AppointmentsResponse,
        BookingResponse,
        CancellationResponse,
        ErrorBody,
        RankedSlot,
    )),
    tags((name = "Scheduling", description = "Appointment scheduling and availability"))
)]
pub struct SchedulingApiDoc;
