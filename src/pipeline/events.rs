//! Event save pipeline

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{store_unavailable, PipelineError, PipelineResult};
use crate::db::{EventRepository, RepositoryError, EVENT_SLUG_CONSTRAINT};
use crate::logging::Timer;
use crate::models::{Event, EventInput, EventKey};

/// Validates event input and writes canonical events to the store
#[derive(Clone)]
pub struct EventPipeline {
    events: Arc<dyn EventRepository>,
    slug_precheck: bool,
}

impl EventPipeline {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self {
            events,
            slug_precheck: false,
        }
    }

    /// Look for a slug collision before writing
    ///
    /// Adds one store round trip whenever the slug changes. The unique
    /// constraint still decides races between concurrent writers.
    pub fn with_slug_precheck(mut self, enabled: bool) -> Self {
        self.slug_precheck = enabled;
        self
    }

    /// Validate and store a new event
    pub async fn create(&self, input: &EventInput) -> PipelineResult<Event> {
        self.save(input, None).await
    }

    /// Validate and store changes to an existing event
    ///
    /// `stored` must be the record as currently persisted. Its slug is kept
    /// unless the title changed.
    pub async fn update(&self, stored: &Event, input: &EventInput) -> PipelineResult<Event> {
        self.save(input, Some(stored)).await
    }

    /// Load an event by id or slug and apply `input` to it
    ///
    /// Returns `Ok(None)` when no event matches the key.
    pub async fn update_by_key(
        &self,
        key: &EventKey,
        input: &EventInput,
    ) -> PipelineResult<Option<Event>> {
        let stored = self.events.find_by_key(key).await.map_err(store_unavailable)?;

        match stored {
            Some(stored) => self.save(input, Some(&stored)).await.map(Some),
            None => {
                debug!(key = %key, "Event to update not found");
                Ok(None)
            },
        }
    }

    async fn save(&self, input: &EventInput, previous: Option<&Event>) -> PipelineResult<Event> {
        let timer = Timer::start("event_pipeline.save");
        let result = self.validate_and_persist(input, previous).await;
        timer.finish(&result);
        result
    }

    async fn validate_and_persist(
        &self,
        input: &EventInput,
        previous: Option<&Event>,
    ) -> PipelineResult<Event> {
        let candidate = input.normalize(previous, Utc::now()).map_err(|e| {
            warn!(field = %e.field, kind = %e.kind, "Event rejected");
            PipelineError::from(e)
        })?;

        let slug_changed = previous.map_or(true, |stored| stored.slug != candidate.slug);
        if self.slug_precheck && slug_changed {
            let taken = self
                .events
                .slug_taken(&candidate.slug, Some(candidate.id))
                .await
                .map_err(store_unavailable)?;
            if taken {
                warn!(slug = %candidate.slug, "Event rejected: slug already taken");
                return Err(PipelineError::DuplicateSlug {
                    slug: candidate.slug,
                });
            }
        }

        let stored = self
            .events
            .persist(&candidate)
            .await
            .map_err(|e| classify_write_error(e, &candidate.slug))?;

        info!(
            event_id = %stored.id,
            slug = %stored.slug,
            created = previous.is_none(),
            "Event saved"
        );

        Ok(stored)
    }
}

/// Map a failed event write to a pipeline error
fn classify_write_error(err: RepositoryError, slug: &str) -> PipelineError {
    if err.is_conflict_on(EVENT_SLUG_CONSTRAINT) {
        warn!(slug = %slug, "Event rejected: slug already taken");
        PipelineError::DuplicateSlug {
            slug: slug.to_string(),
        }
    } else {
        store_unavailable(err)
    }
}
