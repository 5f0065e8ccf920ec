//! Test utilities for eventline
//!
//! In-memory record stores and fixtures for exercising the pipelines without
//! a database. The mocks enforce the same slug uniqueness as the PostgreSQL
//! schema and count the calls the pipelines make.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::db::repository::{PersistRepository, Repository, RepositoryError, RepositoryResult};
use crate::db::{BookingRepository, EventRepository, EVENT_SLUG_CONSTRAINT};
use crate::models::{Booking, Event, EventInput};

/// Shared failure switch: the next store call fails once with the given message
#[derive(Debug, Clone, Default)]
struct FailureSwitch {
    message: Arc<Mutex<Option<String>>>,
}

impl FailureSwitch {
    fn arm(&self, message: &str) {
        *self.message.lock().unwrap() = Some(message.to_string());
    }

    fn check(&self) -> RepositoryResult<()> {
        match self.message.lock().unwrap().take() {
            Some(msg) => Err(RepositoryError::Connection(msg)),
            None => Ok(()),
        }
    }
}

/// Mock implementation of EventRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockEventRepository {
    events: Arc<Mutex<Vec<Event>>>,
    failure: FailureSwitch,
    exists_calls: Arc<AtomicUsize>,
    persist_calls: Arc<AtomicUsize>,
}

impl MockEventRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on the next operation
    pub fn fail_next_operation(&self, error_message: &str) {
        self.failure.arm(error_message);
    }

    /// Get all stored events
    pub fn get_all_events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Add an event directly, bypassing validation
    pub fn add_event(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    /// Remove an event directly
    pub fn remove_event(&self, id: Uuid) {
        self.events.lock().unwrap().retain(|e| e.id != id);
    }

    /// Number of `exists` lookups made so far
    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    /// Number of `persist` calls made so far, successful or not
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for MockEventRepository {
    type Entity = Event;
    type Id = Uuid;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Event>> {
        self.failure.check()?;
        let events = self.events.lock().unwrap();
        Ok(events.iter().find(|e| e.id == id).cloned())
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.failure.check()?;
        let events = self.events.lock().unwrap();
        Ok(events.iter().any(|e| e.id == id))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        self.failure.check()?;
        let mut events = self.events.lock().unwrap();
        let initial_len = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() < initial_len)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        self.failure.check()?;
        Ok(self.events.lock().unwrap().len() as i64)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.failure.check()
    }
}

#[async_trait]
impl PersistRepository for MockEventRepository {
    async fn persist(&self, entity: &Event) -> RepositoryResult<Event> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        self.failure.check()?;

        let mut events = self.events.lock().unwrap();
        if events.iter().any(|e| e.slug == entity.slug && e.id != entity.id) {
            return Err(RepositoryError::Conflict(EVENT_SLUG_CONSTRAINT.to_string()));
        }

        let mut stored = entity.clone();
        if let Some(pos) = events.iter().position(|e| e.id == entity.id) {
            stored.created_at = events[pos].created_at;
            events[pos] = stored.clone();
        } else {
            events.push(stored.clone());
        }
        Ok(stored)
    }
}

#[async_trait]
impl EventRepository for MockEventRepository {
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>> {
        self.failure.check()?;
        let events = self.events.lock().unwrap();
        Ok(events.iter().find(|e| e.slug == slug).cloned())
    }

    async fn slug_taken(&self, slug: &str, excluding: Option<Uuid>) -> RepositoryResult<bool> {
        self.failure.check()?;
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .any(|e| e.slug == slug && Some(e.id) != excluding))
    }

    async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> RepositoryResult<Vec<Event>> {
        self.failure.check()?;
        let mut events = self.events.lock().unwrap().clone();
        events.sort_by(|a, b| {
            (&a.date, &a.time, a.created_at).cmp(&(&b.date, &b.time, b.created_at))
        });
        Ok(events
            .into_iter()
            .skip(offset.unwrap_or(0) as usize)
            .take(limit.unwrap_or(i64::MAX) as usize)
            .collect())
    }
}

/// Mock implementation of BookingRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockBookingRepository {
    bookings: Arc<Mutex<Vec<Booking>>>,
    failure: FailureSwitch,
}

impl MockBookingRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on the next operation
    pub fn fail_next_operation(&self, error_message: &str) {
        self.failure.arm(error_message);
    }

    /// Get all stored bookings
    pub fn get_all_bookings(&self) -> Vec<Booking> {
        self.bookings.lock().unwrap().clone()
    }
}

#[async_trait]
impl Repository for MockBookingRepository {
    type Entity = Booking;
    type Id = Uuid;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Booking>> {
        self.failure.check()?;
        let bookings = self.bookings.lock().unwrap();
        Ok(bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        self.failure.check()?;
        let bookings = self.bookings.lock().unwrap();
        Ok(bookings.iter().any(|b| b.id == id))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        self.failure.check()?;
        let mut bookings = self.bookings.lock().unwrap();
        let initial_len = bookings.len();
        bookings.retain(|b| b.id != id);
        Ok(bookings.len() < initial_len)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        self.failure.check()?;
        Ok(self.bookings.lock().unwrap().len() as i64)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.failure.check()
    }
}

#[async_trait]
impl PersistRepository for MockBookingRepository {
    async fn persist(&self, entity: &Booking) -> RepositoryResult<Booking> {
        self.failure.check()?;
        let mut bookings = self.bookings.lock().unwrap();
        if let Some(pos) = bookings.iter().position(|b| b.id == entity.id) {
            bookings[pos] = entity.clone();
        } else {
            bookings.push(entity.clone());
        }
        Ok(entity.clone())
    }
}

#[async_trait]
impl BookingRepository for MockBookingRepository {
    async fn find_by_event(
        &self,
        event_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<Booking>> {
        self.failure.check()?;
        let bookings = self.bookings.lock().unwrap();
        Ok(bookings
            .iter()
            .filter(|b| b.event_id == event_id)
            .skip(offset.unwrap_or(0) as usize)
            .take(limit.unwrap_or(i64::MAX) as usize)
            .cloned()
            .collect())
    }

    async fn count_by_event(&self, event_id: Uuid) -> RepositoryResult<i64> {
        self.failure.check()?;
        let bookings = self.bookings.lock().unwrap();
        Ok(bookings.iter().filter(|b| b.event_id == event_id).count() as i64)
    }
}

/// A complete, valid event input with the given title
pub fn sample_event_input(title: &str) -> EventInput {
    EventInput {
        title: title.to_string(),
        description: "An evening of talks and demos".to_string(),
        overview: "Talks, demos and networking".to_string(),
        image: "/images/event.png".to_string(),
        venue: "Main Hall".to_string(),
        location: "Porto, Portugal".to_string(),
        date: "2024-03-01".to_string(),
        time: "18:30".to_string(),
        mode: "offline".to_string(),
        audience: "Developers".to_string(),
        agenda: vec!["Doors open".to_string(), "Keynote".to_string()],
        organizer: "Porto Tech Hub".to_string(),
        tags: vec!["tech".to_string(), "meetup".to_string()],
    }
}

/// Create a canonical test event with the given title
pub fn create_test_event(title: &str) -> Event {
    sample_event_input(title)
        .normalize(None, Utc::now())
        .expect("sample event input must be valid")
}
