// --- File: crates/bookify_scheduling/src/error.rs ---

use crate::ranking::RankedSlot;
use bookify_common::{AppointmentStatus, BoxedError, HttpStatusCode};
use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the scheduling engine.
///
/// `SlotConflict` is a recoverable business outcome, not a fault: it
/// carries ranked alternatives and callers are expected to re-prompt with
/// one of them (or retry with the administrative `force` override).
#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("requested slot at {requested} is already booked")]
    SlotConflict {
        requested: NaiveDateTime,
        alternatives: Vec<RankedSlot>,
    },
    #[error("appointment not found: {0}")]
    NotFound(Uuid),
    #[error("appointment {id} is {status} and can no longer be changed")]
    Terminal {
        id: Uuid,
        status: AppointmentStatus,
    },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("repository error: {0}")]
    Repository(#[from] BoxedError),
}

impl HttpStatusCode for SchedulingError {
    fn status_code(&self) -> u16 {
        match self {
            SchedulingError::SlotConflict { .. } => 409,
            SchedulingError::NotFound(_) => 404,
            SchedulingError::Terminal { .. } => 409,
            SchedulingError::Validation(_) => 400,
            SchedulingError::Repository(_) => 500,
        }
    }
}
