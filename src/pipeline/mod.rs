//! Validate-then-persist pipelines for events and bookings
//!
//! Each save runs the pure normalization rules of the record first. Only a
//! fully normalized record reaches the store, through a single `persist`
//! call, so a rejected attempt never leaves a partial write behind.

mod bookings;
mod events;

pub use bookings::BookingPipeline;
pub use events::EventPipeline;

use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{ValidationError, ValidationErrorKind};

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Why a save attempt was rejected
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A field failed validation; nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store refused the write because another event owns the slug
    ///
    /// Retrying with a different title can succeed.
    #[error("Slug '{slug}' is already used by another event")]
    DuplicateSlug { slug: String },

    /// The store call itself failed
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(#[source] RepositoryError),
}

impl PipelineError {
    /// The validation kind, if this is a validation failure
    pub fn validation_kind(&self) -> Option<ValidationErrorKind> {
        match self {
            PipelineError::Validation(e) => Some(e.kind),
            _ => None,
        }
    }

    /// The offending field, if this is a validation failure
    pub fn field(&self) -> Option<&str> {
        match self {
            PipelineError::Validation(e) => Some(e.field.as_str()),
            _ => None,
        }
    }

    /// Whether the same request can be retried unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::StoreUnavailable(_))
    }
}

impl From<PipelineError> for crate::error::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e) => e.into(),
            PipelineError::DuplicateSlug { slug } => {
                crate::error::Error::Conflict(format!("slug '{}' already exists", slug))
            },
            PipelineError::StoreUnavailable(e) => e.into(),
        }
    }
}

fn store_unavailable(err: RepositoryError) -> PipelineError {
    tracing::error!(error = %err, retryable = err.is_retryable(), "Record store call failed");
    PipelineError::StoreUnavailable(err)
}
