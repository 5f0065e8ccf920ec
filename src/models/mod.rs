//! Data models for eventline
//!
//! This module contains the event and booking records, their raw inputs and
//! the pure normalization rules that turn one into the other.

pub mod booking;
pub mod error;
pub mod event;
pub mod slug;
pub mod temporal;
pub mod validation;

// Re-export commonly used types
pub use booking::{Booking, BookingInput};
pub use error::{ValidationError, ValidationErrorKind, ValidationResult};
pub use event::{Event, EventInput, EventKey};
pub use slug::slugify;
pub use temporal::{normalize_date, normalize_time};
pub use validation::{validate_email, validate_list, validate_required, validate_tags};
