//! Validation error types for eventline records
//!
//! These errors are produced before any write reaches the record store and
//! always name the offending field.

use std::fmt;
use thiserror::Error;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The kind of validation error
    pub kind: ValidationErrorKind,
    /// The field that failed validation
    pub field: String,
    /// Optional additional context
    pub context: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ValidationErrorKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            context: None,
        }
    }

    /// Create a validation error with additional context
    pub fn with_context(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            context: Some(context.into()),
        }
    }

    /// Shorthand for a missing or blank field
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MissingField, field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(
                f,
                "Validation failed for field '{}': {} - {}",
                self.field, self.kind, ctx
            ),
            None => write!(
                f,
                "Validation failed for field '{}': {}",
                self.field, self.kind
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Specific validation error types
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required scalar or list field is empty or absent
    #[error("Required field is missing or blank")]
    MissingField,

    /// An element of a list field is blank after trimming
    #[error("List contains a blank item")]
    EmptyListItem,

    /// Date, time or email does not match the required shape
    #[error("Invalid format")]
    InvalidFormat,

    /// A booking references an event that does not exist
    #[error("Referenced record does not exist")]
    DanglingReference,
}

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Convert validation errors to application errors
impl From<ValidationError> for crate::error::Error {
    fn from(err: ValidationError) -> Self {
        crate::error::Error::validation(err.to_string())
    }
}
