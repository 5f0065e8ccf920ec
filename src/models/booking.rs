//! Booking data models for eventline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationResult;
use super::validation::validate_email;

/// Booking fields as submitted by a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInput {
    /// Id of the event being booked
    pub event_id: Uuid,
    pub email: String,
}

impl BookingInput {
    pub fn new(event_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            event_id,
            email: email.into(),
        }
    }

    /// Run the synchronous booking checks
    ///
    /// This covers the email rules only. Whether `event_id` points at an
    /// existing event needs the record store; see
    /// [`BookingInput::needs_reference_check`].
    pub fn normalize(
        &self,
        previous: Option<&Booking>,
        now: DateTime<Utc>,
    ) -> ValidationResult<Booking> {
        let email = validate_email(&self.email, "email")?;

        let (id, created_at) = match previous {
            Some(stored) => (stored.id, stored.created_at),
            None => (Uuid::new_v4(), now),
        };

        Ok(Booking {
            id,
            event_id: self.event_id,
            email,
            created_at,
            updated_at: now,
        })
    }

    /// Whether the event reference must be confirmed before writing
    ///
    /// True for new bookings and for updates that point the booking at a
    /// different event. A reference that was valid when stored is trusted.
    pub fn needs_reference_check(&self, previous: Option<&Booking>) -> bool {
        previous.map_or(true, |stored| stored.event_id != self.event_id)
    }
}

impl From<&Booking> for BookingInput {
    fn from(booking: &Booking) -> Self {
        Self {
            event_id: booking.event_id,
            email: booking.email.clone(),
        }
    }
}

/// Canonical booking record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier
    pub id: Uuid,
    /// Event this booking belongs to
    pub event_id: Uuid,
    /// Trimmed, lower-cased email address
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
