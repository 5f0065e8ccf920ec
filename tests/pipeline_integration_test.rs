//! Pipeline integration tests for eventline
//!
//! These tests run the event and booking pipelines against the in-memory
//! record stores and check what reaches the store for each outcome.

use std::sync::Arc;

use eventline::db::Repository;
use eventline::test_utils::{sample_event_input, MockBookingRepository, MockEventRepository};
use eventline::{
    BookingInput, BookingPipeline, EventInput, EventPipeline, PipelineError, ValidationErrorKind,
};
use uuid::Uuid;

struct Harness {
    events: MockEventRepository,
    bookings: MockBookingRepository,
}

impl Harness {
    fn new() -> Self {
        Self {
            events: MockEventRepository::new(),
            bookings: MockBookingRepository::new(),
        }
    }

    fn event_pipeline(&self) -> EventPipeline {
        EventPipeline::new(Arc::new(self.events.clone()))
    }

    fn booking_pipeline(&self) -> BookingPipeline {
        BookingPipeline::new(
            Arc::new(self.events.clone()),
            Arc::new(self.bookings.clone()),
        )
    }
}

#[tokio::test]
async fn test_unrelated_edit_keeps_slug() {
    let h = Harness::new();
    let pipeline = h.event_pipeline();
    let created = pipeline
        .create(&sample_event_input("Hello, World!! 2024"))
        .await
        .unwrap();

    let mut edit = EventInput::from(&created);
    edit.description = "Rescheduled".to_string();
    edit.date = "2024-04-10".to_string();
    edit.time = "20:15:00".to_string();

    let updated = pipeline.update(&created, &edit).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.slug, "hello-world-2024");
    assert_eq!(updated.date, "2024-04-10");
    assert_eq!(updated.time, "20:15");
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_stored_slug_survives_even_if_rules_would_differ() {
    let h = Harness::new();
    let mut legacy = eventline::test_utils::create_test_event("Launch");
    legacy.slug = "launch-2023".to_string();
    h.events.add_event(legacy.clone());

    let mut edit = EventInput::from(&legacy);
    edit.venue = "Rooftop".to_string();

    let updated = h.event_pipeline().update(&legacy, &edit).await.unwrap();
    assert_eq!(updated.slug, "launch-2023");
}

#[tokio::test]
async fn test_title_change_recomputes_slug() {
    let h = Harness::new();
    let pipeline = h.event_pipeline();
    let created = pipeline.create(&sample_event_input("Demo Day")).await.unwrap();

    let mut edit = EventInput::from(&created);
    edit.title = "Demo Day: Spring Edition".to_string();

    let updated = pipeline.update(&created, &edit).await.unwrap();
    assert_eq!(updated.slug, "demo-day-spring-edition");
    assert_eq!(h.events.get_all_events().len(), 1);
}

#[tokio::test]
async fn test_title_change_into_taken_slug_fails() {
    let h = Harness::new();
    let pipeline = h.event_pipeline();
    pipeline.create(&sample_event_input("Alpha")).await.unwrap();
    let beta = pipeline.create(&sample_event_input("Beta")).await.unwrap();

    let mut edit = EventInput::from(&beta);
    edit.title = "ALPHA".to_string();

    let err = pipeline.update(&beta, &edit).await.unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateSlug { ref slug } if slug == "alpha"));

    let stored = h.events.find_by_id(beta.id).await.unwrap().unwrap();
    assert_eq!(stored.slug, "beta");
}

#[tokio::test]
async fn test_second_event_with_same_slug_fails() {
    let h = Harness::new();
    let pipeline = h.event_pipeline();

    pipeline
        .create(&sample_event_input("  Hello, World!! 2024  "))
        .await
        .unwrap();
    let err = pipeline
        .create(&sample_event_input("hello world 2024"))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::DuplicateSlug { .. }));
    assert!(!err.is_retryable());
    assert_eq!(h.events.get_all_events().len(), 1);
}

#[tokio::test]
async fn test_agenda_failures_never_write() {
    let h = Harness::new();
    let pipeline = h.event_pipeline();

    let mut input = sample_event_input("Meetup");
    input.agenda = vec![];
    let err = pipeline.create(&input).await.unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationErrorKind::MissingField));

    input.agenda = vec!["  ".to_string(), "Keynote".to_string()];
    let err = pipeline.create(&input).await.unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationErrorKind::EmptyListItem));
    assert_eq!(err.field(), Some("agenda"));

    assert_eq!(h.events.persist_calls(), 0);
}

#[tokio::test]
async fn test_booking_create_and_dangling_reference() {
    let h = Harness::new();
    let event = h
        .event_pipeline()
        .create(&sample_event_input("Workshop"))
        .await
        .unwrap();
    let bookings = h.booking_pipeline();

    let err = bookings
        .create(&BookingInput::new(Uuid::new_v4(), "user@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationErrorKind::DanglingReference));

    let booking = bookings
        .create(&BookingInput::new(event.id, "  USER@Example.COM  "))
        .await
        .unwrap();
    assert_eq!(booking.email, "user@example.com");
    assert_eq!(h.bookings.get_all_bookings(), vec![booking]);
}

#[tokio::test]
async fn test_email_update_trusts_stored_reference() {
    let h = Harness::new();
    let event = h
        .event_pipeline()
        .create(&sample_event_input("Workshop"))
        .await
        .unwrap();
    let bookings = h.booking_pipeline();
    let booking = bookings
        .create(&BookingInput::new(event.id, "old@example.com"))
        .await
        .unwrap();
    let lookups = h.events.exists_calls();

    h.events.remove_event(event.id);

    let mut edit = BookingInput::from(&booking);
    edit.email = "New@Example.com".to_string();
    let updated = bookings.update(&booking, &edit).await.unwrap();

    assert_eq!(updated.id, booking.id);
    assert_eq!(updated.email, "new@example.com");
    assert_eq!(h.events.exists_calls(), lookups);
}

#[tokio::test]
async fn test_moving_booking_checks_new_event() {
    let h = Harness::new();
    let event = h
        .event_pipeline()
        .create(&sample_event_input("Workshop"))
        .await
        .unwrap();
    let bookings = h.booking_pipeline();
    let booking = bookings
        .create(&BookingInput::new(event.id, "user@example.com"))
        .await
        .unwrap();

    let mut edit = BookingInput::from(&booking);
    edit.event_id = Uuid::new_v4();
    let err = bookings.update(&booking, &edit).await.unwrap_err();

    assert_eq!(err.validation_kind(), Some(ValidationErrorKind::DanglingReference));
    assert_eq!(h.events.exists_calls(), 2);
    assert_eq!(h.bookings.get_all_bookings()[0].event_id, event.id);
}

#[tokio::test]
async fn test_store_outage_is_surfaced_unchanged() {
    let h = Harness::new();
    h.bookings.fail_next_operation("connection refused");
    let event = h
        .event_pipeline()
        .create(&sample_event_input("Workshop"))
        .await
        .unwrap();

    let err = h
        .booking_pipeline()
        .create(&BookingInput::new(event.id, "user@example.com"))
        .await
        .unwrap_err();

    match err {
        PipelineError::StoreUnavailable(source) => {
            assert!(source.to_string().contains("connection refused"));
        },
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_dates_without_four_digit_year_never_write() {
    let h = Harness::new();
    let pipeline = h.event_pipeline();

    for date in ["+12345-01-01", "-0001-01-01"] {
        let mut input = sample_event_input("Far Future");
        input.date = date.to_string();

        let err = pipeline.create(&input).await.unwrap_err();
        assert_eq!(err.validation_kind(), Some(ValidationErrorKind::InvalidFormat), "{}", date);
        assert_eq!(err.field(), Some("date"));
        assert!(!err.is_retryable());
    }

    assert_eq!(h.events.persist_calls(), 0);
}
