//! End-to-end booking flow against the in-memory wiring: availability,
//! conflicts with alternatives, the force override, cancellation and the
//! notification side channel.


use bookify_common::services::AppointmentRepository;
use bookify_scheduling::error::SchedulingError;
use chrono::{Duration, NaiveDate};
use fixtures::{booking, datetime, harness, settle};

#[tokio::test]
async fn availability_excludes_the_booked_slot_only() {
    let h = harness();

    // 2025-02-15 is a Saturday; the six-day policy keeps it bookable.
    h.service
        .book(booking("7", datetime("2025-02-15T14:00")))
        .await
        .unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
    let slots = h.service.search_available_slots(date, Some(30)).await.unwrap();
    let starts: Vec<String> = slots
        .iter()
        .map(|s| s.start.format("%H:%M").to_string())
        .collect();

    assert!(!starts.contains(&"14:00".to_string()));
    assert!(starts.contains(&"13:30".to_string()));
    assert!(starts.contains(&"14:30".to_string()));
}

#[tokio::test]
async fn conflicting_booking_offers_verified_alternatives() {
    let h = harness();

    let target = datetime("2025-02-15T14:00");
    h.service.book(booking("7", target)).await.unwrap();

    let err = h
        .service
        .book(booking("8", target))
        .await
        .expect_err("second booking of the same slot must conflict");

    let alternatives = match err {
        SchedulingError::SlotConflict {
            requested,
            alternatives,
        } => {
            assert_eq!(requested, target);
            alternatives
        }
        other => panic!("expected SlotConflict, got {other:?}"),
    };

    assert!(!alternatives.is_empty());
    assert!(alternatives.len() <= 5);
    for alternative in &alternatives {
        // Within the 7-day scan window, ahead of the requested time, free,
        // and rendered for direct presentation.
        assert!(alternative.start > target);
        assert!(alternative.start <= target + Duration::days(7));
        assert!(h
            .repository
            .find_by_exact_start(alternative.start)
            .await
            .unwrap()
            .is_empty());
        assert!(!alternative.display.is_empty());
    }
}

#[tokio::test]
async fn force_override_double_books_reproducibly() {
    let h = harness();

    let target = datetime("2025-02-15T14:00");
    h.service.book(booking("7", target)).await.unwrap();

    let mut forced = booking("8", target);
    forced.force = true;
    forced.override_reason = Some("VIP walk-in".to_string());
    h.service.book(forced).await.unwrap();

    let at_slot = h.repository.find_by_exact_start(target).await.unwrap();
    assert_eq!(at_slot.len(), 2);
}

#[tokio::test]
async fn cancelling_reopens_the_slot_in_search() {
    let h = harness();

    let target = datetime("2025-02-15T11:00");
    let appointment = h.service.book(booking("5", target)).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
    let before = h.service.search_available_slots(date, Some(30)).await.unwrap();
    assert!(before.iter().all(|s| s.start != target));

    h.service.cancel(appointment.id).await.unwrap();

    let after = h.service.search_available_slots(date, Some(30)).await.unwrap();
    assert!(after.iter().any(|s| s.start == target));
}

#[tokio::test]
async fn search_results_are_preference_ranked_and_free() {
    let h = harness();

    h.service
        .book(booking("7", datetime("2025-02-17T10:00")))
        .await
        .unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 2, 17).unwrap();
    let slots = h.service.search_available_slots(date, Some(30)).await.unwrap();

    // The booked preferred slot is gone, and the first suggestion is still
    // a preferred hour.
    assert!(slots.iter().all(|s| s.start != datetime("2025-02-17T10:00")));
    assert_eq!(slots[0].start, datetime("2025-02-17T10:30"));
}

#[tokio::test]
async fn booking_emits_calendar_and_confirmation_notifications() {
    let h = harness();

    let appointment = h
        .service
        .book(booking("7", datetime("2025-02-17T09:00")))
        .await
        .unwrap();
    let moved = h
        .service
        .reschedule(appointment.id, datetime("2025-02-17T15:00"))
        .await
        .unwrap();
    h.service.cancel(moved.id).await.unwrap();
    settle().await;

    let events = h.dispatcher.recorded();
    let id = appointment.id;
    assert!(events.contains(&format!("calendar_create:{id}")));
    assert!(events.contains(&format!("confirmation:{id}:customer7@example.com")));
    assert!(events.contains(&format!("calendar_update:{id}")));
    assert!(events.contains(&format!("update:{id}:customer7@example.com")));
    assert!(events.contains(&format!("calendar_delete:{id}")));
}

#[tokio::test]
async fn deleting_tears_down_the_calendar_mirror() {
    let h = harness();

    let appointment = h
        .service
        .book(booking("7", datetime("2025-02-17T13:00")))
        .await
        .unwrap();
    h.service.delete(appointment.id).await.unwrap();
    settle().await;

    assert!(h.repository.get(appointment.id).await.unwrap().is_none());
    assert!(h
        .dispatcher
        .recorded()
        .contains(&format!("calendar_delete:{}", appointment.id)));
}
