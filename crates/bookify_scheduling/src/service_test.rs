#[cfg(test)]
mod tests {
    use crate::error::SchedulingError;
    use crate::outbox::{Outbox, OutboxSettings};
    use crate::ranking::{RecommendationRanker, DEFAULT_PREFERRED_HOURS};
    use crate::service::{BookingRequest, SchedulingService, SchedulingSettings};
    use crate::slots::BusinessHoursPolicy;
    use bookify_common::services::{
        AppointmentRepository, BoxFuture, BoxedError, NotificationDispatcher, NotificationResult,
    };
    use bookify_common::{Appointment, AppointmentStatus, CustomerContact};
    use bookify_db::InMemoryAppointmentRepository;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Arc;
    use uuid::Uuid;

    struct StubDispatcher;

    impl NotificationDispatcher for StubDispatcher {
        type Error = BoxedError;

        fn send_confirmation(
            &self,
            _appointment: Appointment,
            _contact: CustomerContact,
        ) -> BoxFuture<'static, NotificationResult, BoxedError> {
            Box::pin(async {
                Ok(NotificationResult {
                    id: String::new(),
                    status: "sent".to_string(),
                })
            })
        }

        fn send_update(
            &self,
            _appointment: Appointment,
            _contact: CustomerContact,
        ) -> BoxFuture<'static, NotificationResult, BoxedError> {
            Box::pin(async {
                Ok(NotificationResult {
                    id: String::new(),
                    status: "sent".to_string(),
                })
            })
        }

        fn create_calendar_event(
            &self,
            _appointment: Appointment,
        ) -> BoxFuture<'static, Option<String>, BoxedError> {
            Box::pin(async { Ok(None) })
        }

        fn update_calendar_event(
            &self,
            _appointment: Appointment,
        ) -> BoxFuture<'static, Option<String>, BoxedError> {
            Box::pin(async { Ok(None) })
        }

        fn delete_calendar_event(
            &self,
            _appointment_id: Uuid,
        ) -> BoxFuture<'static, String, BoxedError> {
            Box::pin(async { Ok("ok".to_string()) })
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        // 2025-06-09 is a Monday; days 9..13 are a full working week.
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn service(repo: Arc<InMemoryAppointmentRepository>) -> SchedulingService {
        SchedulingService::new(
            repo,
            Outbox::start(Arc::new(StubDispatcher), OutboxSettings::default()),
            BusinessHoursPolicy::office_hours(),
            RecommendationRanker::new(DEFAULT_PREFERRED_HOURS.to_vec(), 5),
            SchedulingSettings::default(),
        )
    }

    fn booking(customer_id: &str, scheduled_at: NaiveDateTime) -> BookingRequest {
        BookingRequest {
            customer_id: customer_id.to_string(),
            scheduled_at,
            duration_minutes: Some(30),
            appointment_type: "consultation".to_string(),
            notes: None,
            contact_email: None,
            force: false,
            override_reason: None,
        }
    }

    #[tokio::test]
    async fn rebooking_a_taken_slot_conflicts_with_alternatives() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo.clone());

        let target = at(9, 14, 0);
        service.book(booking("7", target)).await.unwrap();

        let err = service.book(booking("8", target)).await.unwrap_err();
        match err {
            SchedulingError::SlotConflict {
                requested,
                alternatives,
            } => {
                assert_eq!(requested, target);
                assert!(!alternatives.is_empty());
                assert!(alternatives.len() <= 5);
                for alternative in &alternatives {
                    assert_ne!(alternative.start, target);
                    // Each suggested slot is itself free.
                    let clashing = repo
                        .find_by_exact_start(alternative.start)
                        .await
                        .unwrap();
                    assert!(clashing.is_empty());
                }
            }
            other => panic!("expected SlotConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn force_booking_bypasses_the_check() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo.clone());

        let target = at(9, 14, 0);
        service.book(booking("7", target)).await.unwrap();

        let mut forced = booking("8", target);
        forced.force = true;
        forced.override_reason = Some("walk-in approved by manager".to_string());
        service.book(forced).await.unwrap();

        let at_slot = repo.find_by_exact_start(target).await.unwrap();
        assert_eq!(at_slot.len(), 2);
        assert!(at_slot
            .iter()
            .all(|a| a.status == AppointmentStatus::Scheduled));
    }

    #[tokio::test]
    async fn reschedule_frees_the_old_slot_and_occupies_the_new() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo.clone());

        let original = at(9, 10, 0);
        let moved_to = at(9, 15, 0);
        let appointment = service.book(booking("7", original)).await.unwrap();

        let updated = service.reschedule(appointment.id, moved_to).await.unwrap();
        assert_eq!(updated.scheduled_at, moved_to);

        // The original slot is bookable again by someone else.
        service.book(booking("8", original)).await.unwrap();

        // The new slot is not.
        let err = service.book(booking("9", moved_to)).await.unwrap_err();
        assert!(matches!(err, SchedulingError::SlotConflict { .. }));
    }

    #[tokio::test]
    async fn reschedule_onto_a_taken_slot_does_not_mutate() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo.clone());

        let blocked = at(9, 11, 0);
        service.book(booking("7", blocked)).await.unwrap();
        let movable = service.book(booking("8", at(9, 9, 0))).await.unwrap();

        let err = service.reschedule(movable.id, blocked).await.unwrap_err();
        assert!(matches!(err, SchedulingError::SlotConflict { .. }));

        let unchanged = repo.get(movable.id).await.unwrap().unwrap();
        assert_eq!(unchanged.scheduled_at, at(9, 9, 0));
    }

    #[tokio::test]
    async fn cancel_frees_the_slot_and_is_terminal() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo.clone());

        let target = at(9, 13, 0);
        let appointment = service.book(booking("7", target)).await.unwrap();

        let cancelled = service.cancel(appointment.id).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        // Slot is open again.
        service.book(booking("8", target)).await.unwrap();

        // No transitions out of a terminal state.
        assert!(matches!(
            service.cancel(appointment.id).await.unwrap_err(),
            SchedulingError::Terminal { .. }
        ));
        assert!(matches!(
            service.reschedule(appointment.id, at(10, 9, 0)).await.unwrap_err(),
            SchedulingError::Terminal { .. }
        ));
    }

    #[tokio::test]
    async fn complete_is_terminal_too() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo.clone());

        let appointment = service.book(booking("7", at(9, 9, 30))).await.unwrap();
        let completed = service.complete(appointment.id).await.unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);

        assert!(matches!(
            service.complete(appointment.id).await.unwrap_err(),
            SchedulingError::Terminal { .. }
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_record_entirely() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo.clone());

        let appointment = service.book(booking("7", at(9, 16, 0))).await.unwrap();
        service.delete(appointment.id).await.unwrap();

        assert!(repo.get(appointment.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete(appointment.id).await.unwrap_err(),
            SchedulingError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn unknown_appointment_is_not_found() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo);

        let missing = Uuid::new_v4();
        assert!(matches!(
            service.reschedule(missing, at(9, 9, 0)).await.unwrap_err(),
            SchedulingError::NotFound(id) if id == missing
        ));
        assert!(matches!(
            service.cancel(missing).await.unwrap_err(),
            SchedulingError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn validation_rejects_before_touching_storage() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo.clone());

        let mut bad_duration = booking("7", at(9, 10, 0));
        bad_duration.duration_minutes = Some(0);
        assert!(matches!(
            service.book(bad_duration).await.unwrap_err(),
            SchedulingError::Validation(_)
        ));

        let no_customer = booking("  ", at(9, 10, 0));
        assert!(matches!(
            service.book(no_customer).await.unwrap_err(),
            SchedulingError::Validation(_)
        ));

        assert!(matches!(
            service.list_upcoming(0).await.unwrap_err(),
            SchedulingError::Validation(_)
        ));

        assert!(repo.find_by_customer("7").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upcoming_lists_only_scheduled_inside_the_window() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo);

        // Anchored to the clock because list_upcoming starts from now.
        let soon = chrono::Local::now().naive_local() + chrono::Duration::days(2);
        let far = chrono::Local::now().naive_local() + chrono::Duration::days(30);

        let kept = service.book(booking("7", soon)).await.unwrap();
        service.book(booking("7", far)).await.unwrap();
        let dropped = service
            .book(booking("8", soon + chrono::Duration::hours(2)))
            .await
            .unwrap();
        service.cancel(dropped.id).await.unwrap();

        let upcoming = service.list_upcoming(7).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, kept.id);
    }

    #[tokio::test]
    async fn customer_history_spans_all_states() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let service = service(repo);

        let first = service.book(booking("7", at(9, 9, 0))).await.unwrap();
        service.book(booking("7", at(10, 9, 0))).await.unwrap();
        service.book(booking("8", at(11, 9, 0))).await.unwrap();
        service.cancel(first.id).await.unwrap();

        let history = service.list_for_customer("7").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, AppointmentStatus::Cancelled);
        assert_eq!(history[1].status, AppointmentStatus::Scheduled);
    }
}
