//! Eventline Library
//!
//! Validation, normalization and persistence for event listings and their
//! bookings. Raw input goes through an [`EventPipeline`] or
//! [`BookingPipeline`], which either rejects it with a field-level error or
//! writes exactly one canonical record to the store.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{Error, Result};

// Re-export model types
pub use models::{
    Booking, BookingInput, Event, EventInput, EventKey, ValidationError, ValidationErrorKind,
};

// Re-export pipelines
pub use pipeline::{BookingPipeline, EventPipeline, PipelineError, PipelineResult};
