//! Tests for the booking lifecycle state machine: role-gated transitions,
//! terminal-state monotonicity, and the completion side effect.

mod common;

use common::{engines, future_date, seed_tutor, student, tutor_principal};
use edu_bridge_core::booking::CreateBookingRequest;
use edu_bridge_core::ports::SchedulingStore;
use edu_bridge_core::{BookingError, BookingStatus};
use uuid::Uuid;

fn request(tutor_id: Uuid, start: &str, end: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        tutor_id,
        subject: "Essay feedback".to_string(),
        date: future_date(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        duration_minutes: 60,
        price: 35.0,
        notes: None,
        meeting_link: Some("https://meet.example/abc".to_string()),
    }
}

#[tokio::test]
async fn tutor_completes_a_confirmed_booking_and_sessions_increment() {
    let env = engines();
    let tutor = seed_tutor(&env.store).await;
    let me = student();

    let booking = env
        .bookings
        .create(me.user_id, request(tutor.id, "09:00", "10:00"))
        .await
        .expect("create");

    let completed = env
        .bookings
        .complete(&tutor_principal(&tutor), booking.id)
        .await
        .expect("complete");
    assert_eq!(completed.status, BookingStatus::Completed);

    let profile = env.store.get_tutor_by_id(tutor.id).await.expect("tutor");
    assert_eq!(profile.total_sessions, 1);
}

#[tokio::test]
async fn only_the_tutor_of_record_may_complete() {
    let env = engines();
    let tutor = seed_tutor(&env.store).await;
    let me = student();

    let booking = env
        .bookings
        .create(me.user_id, request(tutor.id, "09:00", "10:00"))
        .await
        .expect("create");

    // Neither the student nor another tutor may complete.
    let err = env.bookings.complete(&me, booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::Forbidden));

    let other = seed_tutor(&env.store).await;
    let err = env
        .bookings
        .complete(&tutor_principal(&other), booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Forbidden));
}

#[tokio::test]
async fn either_party_may_cancel_but_strangers_may_not() {
    let env = engines();
    let tutor = seed_tutor(&env.store).await;
    let me = student();

    let first = env
        .bookings
        .create(me.user_id, request(tutor.id, "09:00", "10:00"))
        .await
        .expect("create");
    let second = env
        .bookings
        .create(me.user_id, request(tutor.id, "10:00", "11:00"))
        .await
        .expect("create");

    let err = env.bookings.cancel(&student(), first.id).await.unwrap_err();
    assert!(matches!(err, BookingError::Forbidden));

    let cancelled = env.bookings.cancel(&me, first.id).await.expect("student");
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let cancelled = env
        .bookings
        .cancel(&tutor_principal(&tutor), second.id)
        .await
        .expect("tutor");
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn cancelled_is_terminal() {
    let env = engines();
    let tutor = seed_tutor(&env.store).await;
    let me = student();

    let booking = env
        .bookings
        .create(me.user_id, request(tutor.id, "09:00", "10:00"))
        .await
        .expect("create");
    env.bookings.cancel(&me, booking.id).await.expect("cancel");

    let err = env.bookings.cancel(&me, booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::AlreadyCancelled));

    let err = env
        .bookings
        .complete(&tutor_principal(&tutor), booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotConfirmed));

    let after = env
        .store
        .get_booking(booking.id)
        .await
        .expect("still persisted");
    assert_eq!(after.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn completed_is_terminal() {
    let env = engines();
    let tutor = seed_tutor(&env.store).await;
    let me = student();

    let booking = env
        .bookings
        .create(me.user_id, request(tutor.id, "09:00", "10:00"))
        .await
        .expect("create");
    env.bookings
        .complete(&tutor_principal(&tutor), booking.id)
        .await
        .expect("complete");

    let err = env.bookings.cancel(&me, booking.id).await.unwrap_err();
    assert!(matches!(err, BookingError::CannotCancelCompleted));

    let err = env
        .bookings
        .complete(&tutor_principal(&tutor), booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotConfirmed));

    // The failed attempts changed nothing, and the session counter moved
    // exactly once.
    let after = env.store.get_booking(booking.id).await.expect("booking");
    assert_eq!(after.status, BookingStatus::Completed);
    let profile = env.store.get_tutor_by_id(tutor.id).await.expect("tutor");
    assert_eq!(profile.total_sessions, 1);
}

#[tokio::test]
async fn lifecycle_calls_on_missing_bookings_report_not_found() {
    let env = engines();
    let tutor = seed_tutor(&env.store).await;

    let err = env
        .bookings
        .complete(&tutor_principal(&tutor), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound));

    let err = env
        .bookings
        .cancel(&student(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_complete_and_cancel_admit_exactly_one_winner() {
    let env = engines();
    let tutor = seed_tutor(&env.store).await;
    let me = student();

    let booking = env
        .bookings
        .create(me.user_id, request(tutor.id, "09:00", "10:00"))
        .await
        .expect("create");

    let complete = {
        let bookings = env.bookings.clone();
        let principal = tutor_principal(&tutor);
        let id = booking.id;
        tokio::spawn(async move { bookings.complete(&principal, id).await })
    };
    let cancel = {
        let bookings = env.bookings.clone();
        let id = booking.id;
        tokio::spawn(async move { bookings.cancel(&me, id).await })
    };

    let completed = complete.await.expect("task").is_ok();
    let cancelled = cancel.await.expect("task").is_ok();
    assert!(
        completed ^ cancelled,
        "exactly one transition may win (completed={completed}, cancelled={cancelled})"
    );

    let after = env.store.get_booking(booking.id).await.expect("booking");
    let profile = env.store.get_tutor_by_id(tutor.id).await.expect("tutor");
    if completed {
        assert_eq!(after.status, BookingStatus::Completed);
        assert_eq!(profile.total_sessions, 1);
    } else {
        assert_eq!(after.status, BookingStatus::Cancelled);
        assert_eq!(profile.total_sessions, 0);
    }
}
