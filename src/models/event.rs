//! Event data models for eventline
//!
//! This module defines the raw event input submitted by callers and the
//! canonical event record that is written to the record store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::{ValidationError, ValidationErrorKind, ValidationResult};
use super::slug::slugify;
use super::temporal::{normalize_date, normalize_time};
use super::validation::{validate_list, validate_required, validate_tags};

/// Event fields as submitted by a caller
///
/// Nothing here is trusted: every field is checked and normalized by
/// [`EventInput::normalize`] before it can become an [`Event`]. Absent fields
/// deserialize as empty values and are reported as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub overview: String,
    /// Image reference or URL
    pub image: String,
    pub venue: String,
    pub location: String,
    /// Free-form date, e.g. `2024-03-01` or `March 1, 2024`
    pub date: String,
    /// Clock time as `HH:MM` or `HH:MM:SS`
    pub time: String,
    /// Attendance mode, e.g. online, offline or hybrid
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

impl EventInput {
    /// Validate and normalize this input into a canonical event record
    ///
    /// `previous` is the currently stored version of the record when this is
    /// an update. It supplies the identity and creation time, and its slug is
    /// kept unless the title changed. Checks run in a fixed order and stop at
    /// the first failure. No I/O happens here.
    pub fn normalize(
        &self,
        previous: Option<&Event>,
        now: DateTime<Utc>,
    ) -> ValidationResult<Event> {
        let title = validate_required(&self.title, "title")?;
        let description = validate_required(&self.description, "description")?;
        let overview = validate_required(&self.overview, "overview")?;
        let image = validate_required(&self.image, "image")?;
        let venue = validate_required(&self.venue, "venue")?;
        let location = validate_required(&self.location, "location")?;
        let mode = validate_required(&self.mode, "mode")?;
        let audience = validate_required(&self.audience, "audience")?;
        let organizer = validate_required(&self.organizer, "organizer")?;

        let agenda = validate_list(&self.agenda, "agenda")?;
        let tags = validate_tags(&self.tags, "tags")?;

        let date = normalize_date(&self.date)?;
        let time = normalize_time(&self.time)?;

        let slug = match previous {
            Some(stored) if stored.title == title => stored.slug.clone(),
            _ => derive_slug(&title)?,
        };

        let (id, created_at) = match previous {
            Some(stored) => (stored.id, stored.created_at),
            None => (Uuid::new_v4(), now),
        };

        Ok(Event {
            id,
            title,
            slug,
            description,
            overview,
            image,
            venue,
            location,
            date,
            time,
            mode,
            audience,
            agenda,
            organizer,
            tags,
            created_at,
            updated_at: now,
        })
    }
}

/// Build an edit buffer from a stored event
///
/// Updates are expressed by loading a record, changing fields on the input
/// and normalizing it again against the stored version.
impl From<&Event> for EventInput {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            overview: event.overview.clone(),
            image: event.image.clone(),
            venue: event.venue.clone(),
            location: event.location.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            mode: event.mode.clone(),
            audience: event.audience.clone(),
            agenda: event.agenda.clone(),
            organizer: event.organizer.clone(),
            tags: event.tags.clone(),
        }
    }
}

/// Derive the slug for a title, rejecting titles with no usable characters
fn derive_slug(title: &str) -> ValidationResult<String> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(ValidationError::with_context(
            ValidationErrorKind::MissingField,
            "title",
            "Title must contain at least one letter or digit",
        ));
    }
    Ok(slug)
}

/// Canonical event record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier
    pub id: Uuid,
    pub title: String,
    /// URL-safe identifier derived from the title, unique across events
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    /// Calendar date as `YYYY-MM-DD` (UTC)
    pub date: String,
    /// Clock time as `HH:MM`
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    /// Lower-cased tags
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Check whether the event carries a tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().to_lowercase();
        self.tags.iter().any(|t| *t == wanted)
    }
}

/// Lookup key for an event: its id or its slug
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Id(Uuid),
    Slug(String),
}

impl EventKey {
    /// Interpret a path segment or reference as an id if it parses as one,
    /// otherwise as a slug
    pub fn parse(key: &str) -> Self {
        let key = key.trim();
        match Uuid::parse_str(key) {
            Ok(id) => EventKey::Id(id),
            Err(_) => EventKey::Slug(key.to_lowercase()),
        }
    }
}

impl From<Uuid> for EventKey {
    fn from(id: Uuid) -> Self {
        EventKey::Id(id)
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Id(id) => write!(f, "id:{}", id),
            EventKey::Slug(slug) => write!(f, "slug:{}", slug),
        }
    }
}
