//! In-memory implementation of the appointment repository
//!
//! Used by tests and by deployments that run without a database section in
//! their configuration. One mutex guards the whole store, which makes the
//! conflict-guarded writes atomic the same way the SQL statement is.

use bookify_common::services::{AppointmentRepository, BoxFuture, BoxedError, GuardedWrite};
use bookify_common::{Appointment, AppointmentStatus};
use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct InMemoryAppointmentRepository {
    store: Arc<Mutex<HashMap<Uuid, Appointment>>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Appointment>> {
        self.store.lock().expect("appointment store lock poisoned")
    }

    fn clashes(
        store: &HashMap<Uuid, Appointment>,
        start: NaiveDateTime,
        duration_minutes: i64,
        exclude: Option<Uuid>,
    ) -> Vec<Appointment> {
        let duration = Duration::minutes(duration_minutes);
        let mut found: Vec<Appointment> = store
            .values()
            .filter(|a| {
                a.status == AppointmentStatus::Scheduled
                    && Some(a.id) != exclude
                    && a.overlaps(start, duration)
            })
            .cloned()
            .collect();
        found.sort_by_key(|a| a.scheduled_at);
        found
    }

    fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
        appointments.sort_by_key(|a| a.scheduled_at);
        appointments
    }
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    type Error = BoxedError;

    fn get(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, Self::Error> {
        Box::pin(async move { Ok(self.lock().get(&id).cloned()) })
    }

    fn insert(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, Self::Error> {
        Box::pin(async move {
            self.lock().insert(appointment.id, appointment.clone());
            Ok(appointment)
        })
    }

    fn insert_if_free(&self, appointment: Appointment) -> BoxFuture<'_, GuardedWrite, Self::Error> {
        Box::pin(async move {
            let mut store = self.lock();
            let clashes = Self::clashes(
                &store,
                appointment.scheduled_at,
                appointment.duration_minutes,
                None,
            );
            if !clashes.is_empty() {
                return Ok(GuardedWrite::SlotTaken(clashes));
            }
            store.insert(appointment.id, appointment.clone());
            Ok(GuardedWrite::Committed(appointment))
        })
    }

    fn update(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, Self::Error> {
        Box::pin(async move {
            self.lock().insert(appointment.id, appointment.clone());
            Ok(appointment)
        })
    }

    fn update_if_free(&self, appointment: Appointment) -> BoxFuture<'_, GuardedWrite, Self::Error> {
        Box::pin(async move {
            let mut store = self.lock();
            let clashes = Self::clashes(
                &store,
                appointment.scheduled_at,
                appointment.duration_minutes,
                Some(appointment.id),
            );
            if !clashes.is_empty() {
                return Ok(GuardedWrite::SlotTaken(clashes));
            }
            store.insert(appointment.id, appointment.clone());
            Ok(GuardedWrite::Committed(appointment))
        })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, bool, Self::Error> {
        Box::pin(async move { Ok(self.lock().remove(&id).is_some()) })
    }

    fn find_by_exact_start(
        &self,
        scheduled_at: NaiveDateTime,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        Box::pin(async move {
            let found = self
                .lock()
                .values()
                .filter(|a| a.scheduled_at == scheduled_at)
                .cloned()
                .collect();
            Ok(Self::sorted(found))
        })
    }

    fn find_by_customer(&self, customer_id: &str) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        let customer_id = customer_id.to_string();
        Box::pin(async move {
            let found = self
                .lock()
                .values()
                .filter(|a| a.customer_id == customer_id)
                .cloned()
                .collect();
            Ok(Self::sorted(found))
        })
    }

    fn find_upcoming(
        &self,
        from: NaiveDateTime,
        within_days: i64,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        Box::pin(async move {
            let until = from + Duration::days(within_days);
            let found = self
                .lock()
                .values()
                .filter(|a| {
                    a.status == AppointmentStatus::Scheduled
                        && a.scheduled_at >= from
                        && a.scheduled_at < until
                })
                .cloned()
                .collect();
            Ok(Self::sorted(found))
        })
    }

    fn find_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        Box::pin(async move {
            let found = self
                .lock()
                .values()
                .filter(|a| a.scheduled_at >= start && a.scheduled_at < end)
                .cloned()
                .collect();
            Ok(Self::sorted(found))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn appointment(hour: u32, duration_minutes: i64) -> Appointment {
        let scheduled_at = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Appointment {
            id: Uuid::new_v4(),
            customer_id: "11".to_string(),
            scheduled_at,
            duration_minutes,
            status: AppointmentStatus::Scheduled,
            appointment_type: "phone_call".to_string(),
            notes: None,
            contact_email: None,
            created_at: scheduled_at,
            updated_at: scheduled_at,
        }
    }

    #[tokio::test]
    async fn guarded_insert_is_atomic_per_slot() {
        let repo = InMemoryAppointmentRepository::new();

        assert!(matches!(
            repo.insert_if_free(appointment(14, 30)).await.unwrap(),
            GuardedWrite::Committed(_)
        ));
        assert!(matches!(
            repo.insert_if_free(appointment(14, 30)).await.unwrap(),
            GuardedWrite::SlotTaken(_)
        ));

        // Unconditional insert is the force path.
        repo.insert(appointment(14, 30)).await.unwrap();
        let at = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        assert_eq!(repo.find_by_exact_start(at).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn range_queries_filter_status() {
        let repo = InMemoryAppointmentRepository::new();
        let mut cancelled = appointment(9, 30);
        cancelled.status = AppointmentStatus::Cancelled;
        repo.insert(cancelled).await.unwrap();
        repo.insert(appointment(10, 30)).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        // find_upcoming is scheduled-only, find_by_date_range is not.
        assert_eq!(repo.find_upcoming(day, 1).await.unwrap().len(), 1);
        assert_eq!(
            repo.find_by_date_range(day, day + Duration::days(1))
                .await
                .unwrap()
                .len(),
            2
        );
    }
}
