//! Integration tests for eventline data models
//!
//! These tests drive the pure normalization rules through the public API,
//! including JSON input as a request handler would receive it.

use chrono::Utc;
use eventline::models::{normalize_date, normalize_time, slugify};
use eventline::test_utils::sample_event_input;
use eventline::{BookingInput, EventInput, ValidationErrorKind};
use serde_json::json;
use uuid::Uuid;

/// Helper to create a valid raw event JSON
fn valid_event_json() -> serde_json::Value {
    json!({
        "title": "  Rust Meetup: Async Edition ",
        "description": "Talks about async Rust",
        "overview": "Async deep dive",
        "image": "/images/rust.png",
        "venue": "Room 4",
        "location": "Berlin",
        "date": "2024-03-01T23:00:00-05:00",
        "time": "19:00:00",
        "mode": "hybrid",
        "audience": "Rustaceans",
        "agenda": ["  Welcome ", "Talks"],
        "organizer": "Rust Berlin",
        "tags": [" Rust", "ASYNC "]
    })
}

#[test]
fn test_event_from_json_is_normalized() {
    let input: EventInput = serde_json::from_value(valid_event_json()).expect("valid input");
    let event = input.normalize(None, Utc::now()).expect("accepted");

    assert_eq!(event.title, "Rust Meetup: Async Edition");
    assert_eq!(event.slug, "rust-meetup-async-edition");
    assert_eq!(event.date, "2024-03-02");
    assert_eq!(event.time, "19:00");
    assert_eq!(event.agenda, vec!["Welcome", "Talks"]);
    assert_eq!(event.tags, vec!["rust", "async"]);
    assert!(event.has_tag("rust"));
}

#[test]
fn test_missing_json_fields_are_rejected() {
    let mut value = valid_event_json();
    value.as_object_mut().unwrap().remove("venue");

    let input: EventInput = serde_json::from_value(value).expect("defaults fill gaps");
    let err = input.normalize(None, Utc::now()).unwrap_err();

    assert_eq!(err.kind, ValidationErrorKind::MissingField);
    assert_eq!(err.field, "venue");
}

#[test]
fn test_first_failure_wins() {
    let mut input = sample_event_input("Meetup");
    input.description = " ".to_string();
    input.agenda = vec![];
    input.date = "not-a-date".to_string();

    let err = input.normalize(None, Utc::now()).unwrap_err();
    assert_eq!(err.field, "description");

    input.description = "Back again".to_string();
    let err = input.normalize(None, Utc::now()).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::MissingField);
    assert_eq!(err.field, "agenda");

    input.agenda = vec!["  ".to_string(), "Keynote".to_string()];
    let err = input.normalize(None, Utc::now()).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::EmptyListItem);

    input.agenda = vec!["Keynote".to_string()];
    let err = input.normalize(None, Utc::now()).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::InvalidFormat);
    assert_eq!(err.field, "date");
}

#[test]
fn test_punctuation_only_title_is_rejected() {
    let err = sample_event_input("!!!").normalize(None, Utc::now()).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::MissingField);
    assert_eq!(err.field, "title");
}

#[test]
fn test_canonical_values_are_fixed_points() {
    assert_eq!(normalize_time("09:05:30").unwrap(), "09:05");
    assert_eq!(normalize_time("09:05").unwrap(), "09:05");
    assert_eq!(
        normalize_time("9:5").unwrap_err().kind,
        ValidationErrorKind::InvalidFormat
    );

    assert_eq!(normalize_date("2024-03-02").unwrap(), "2024-03-02");
    assert_eq!(
        normalize_date("not-a-date").unwrap_err().kind,
        ValidationErrorKind::InvalidFormat
    );

    assert_eq!(slugify("  Hello, World!! 2024  "), "hello-world-2024");
    assert_eq!(slugify("hello-world-2024"), "hello-world-2024");
    assert_eq!(slugify("!!!"), "");
}

#[test]
fn test_renormalizing_an_event_changes_nothing() {
    let first = sample_event_input("Weekly Sync")
        .normalize(None, Utc::now())
        .unwrap();
    let again = EventInput::from(&first)
        .normalize(Some(&first), first.updated_at)
        .unwrap();

    assert_eq!(again, first);
}

#[test]
fn test_booking_json_input() {
    let event_id = Uuid::new_v4();
    let input: BookingInput = serde_json::from_value(json!({
        "event_id": event_id.to_string(),
        "email": "  USER@Example.COM  "
    }))
    .expect("valid booking json");

    let booking = input.normalize(None, Utc::now()).unwrap();
    assert_eq!(booking.event_id, event_id);
    assert_eq!(booking.email, "user@example.com");
    assert!(input.needs_reference_check(None));
    assert!(!input.needs_reference_check(Some(&booking)));
}

#[test]
fn test_booking_email_rules() {
    let event_id = Uuid::new_v4();

    let err = BookingInput::new(event_id, "   ")
        .normalize(None, Utc::now())
        .unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::MissingField);

    for email in ["user@", "@example.com", "user@example", "us er@example.com"] {
        let err = BookingInput::new(event_id, email)
            .normalize(None, Utc::now())
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidFormat, "{}", email);
        assert_eq!(err.field, "email");
    }
}
