// --- File: crates/bookify_scheduling/src/routes.rs ---

use crate::handlers::{
    book_appointment_handler, cancel_handler, complete_handler, customer_appointments_handler,
    delete_appointment_handler, get_availability_handler, reschedule_handler, upcoming_handler,
    SchedulingState,
};
use crate::service::SchedulingService;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use bookify_config::AppConfig;
use std::sync::Arc;

/// Creates a router containing all routes for the scheduling engine.
/// The service is built by the caller so the repository and outbox wiring
/// stay in one place.
pub fn routes(config: Arc<AppConfig>, service: Arc<SchedulingService>) -> Router {
    let state = Arc::new(SchedulingState { config, service });

    Router::new()
        .route("/scheduling/availability", get(get_availability_handler))
        .route("/scheduling/appointments", post(book_appointment_handler))
        .route("/scheduling/appointments/upcoming", get(upcoming_handler))
        .route(
            "/scheduling/appointments/{id}/reschedule",
            patch(reschedule_handler),
        )
        .route("/scheduling/appointments/{id}/cancel", patch(cancel_handler))
        .route(
            "/scheduling/appointments/{id}/complete",
            patch(complete_handler),
        )
        .route(
            "/scheduling/appointments/{id}",
            delete(delete_appointment_handler),
        )
        .route(
            "/scheduling/customers/{customer_id}/appointments",
            get(customer_appointments_handler),
        )
        .with_state(state)
}
