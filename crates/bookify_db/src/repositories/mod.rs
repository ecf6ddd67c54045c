//! Repository implementations for appointment persistence

pub mod appointment_memory;
pub mod appointment_sql;

pub use appointment_memory::InMemoryAppointmentRepository;
pub use appointment_sql::SqlAppointmentRepository;
