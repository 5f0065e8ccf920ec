//! Booking save pipeline

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{store_unavailable, PipelineError, PipelineResult};
use crate::db::{BookingRepository, EventRepository};
use crate::logging::Timer;
use crate::models::{Booking, BookingInput, ValidationError, ValidationErrorKind};

/// Validates booking input and writes canonical bookings to the store
#[derive(Clone)]
pub struct BookingPipeline {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingPipeline {
    pub fn new(events: Arc<dyn EventRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { events, bookings }
    }

    /// Validate and store a new booking
    pub async fn create(&self, input: &BookingInput) -> PipelineResult<Booking> {
        self.save(input, None).await
    }

    /// Validate and store changes to an existing booking
    ///
    /// The event reference is only looked up again when `input` moves the
    /// booking to a different event.
    pub async fn update(&self, stored: &Booking, input: &BookingInput) -> PipelineResult<Booking> {
        self.save(input, Some(stored)).await
    }

    async fn save(
        &self,
        input: &BookingInput,
        previous: Option<&Booking>,
    ) -> PipelineResult<Booking> {
        let timer = Timer::start("booking_pipeline.save");
        let result = self.validate_and_persist(input, previous).await;
        timer.finish(&result);
        result
    }

    async fn validate_and_persist(
        &self,
        input: &BookingInput,
        previous: Option<&Booking>,
    ) -> PipelineResult<Booking> {
        let candidate = input.normalize(previous, Utc::now()).map_err(|e| {
            warn!(field = %e.field, kind = %e.kind, "Booking rejected");
            PipelineError::from(e)
        })?;

        if input.needs_reference_check(previous) {
            let found = self
                .events
                .exists(candidate.event_id)
                .await
                .map_err(store_unavailable)?;

            if !found {
                warn!(event_id = %candidate.event_id, "Booking rejected: event does not exist");
                return Err(ValidationError::with_context(
                    ValidationErrorKind::DanglingReference,
                    "event_id",
                    format!("No event with id {}", candidate.event_id),
                )
                .into());
            }
        } else {
            debug!(booking_id = %candidate.id, "Event reference unchanged, skipping lookup");
        }

        let stored = self
            .bookings
            .persist(&candidate)
            .await
            .map_err(store_unavailable)?;

        info!(
            booking_id = %stored.id,
            event_id = %stored.event_id,
            created = previous.is_none(),
            "Booking saved"
        );

        Ok(stored)
    }
}
