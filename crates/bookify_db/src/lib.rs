//! Appointment persistence for Bookify
//!
//! Provides the SQLx-backed appointment repository plus an in-memory
//! drop-in used by tests and database-less deployments. Both implement
//! `bookify_common::services::AppointmentRepository`.

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{InMemoryAppointmentRepository, SqlAppointmentRepository};
