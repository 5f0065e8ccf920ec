//! Error handling module for eventline
//!
//! Application-level error type used by the binary and by callers that embed
//! the library. The validation pipeline has its own finer-grained error in
//! [`crate::pipeline::PipelineError`], which converts into this one.

use thiserror::Error;

/// Result type alias for eventline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for eventline
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Validation errors for incoming data
    #[error("Validation error: {0}")]
    Validation(String),

    /// A write collided with a uniqueness constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a database error
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Error::Database(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Timeout(_))
    }

    /// Short machine-readable name for the error category
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Config(_) => "configuration_error",
            Error::Database(_) => "database_error",
            Error::Validation(_) => "validation_error",
            Error::Conflict(_) => "conflict",
            Error::Migration(_) => "migration_error",
            Error::Internal(_) => "internal_error",
            Error::NotFound(_) => "not_found",
            Error::Timeout(_) => "timeout",
        }
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        assert_eq!(Error::validation("test").error_type(), "validation_error");
        assert_eq!(Error::NotFound("test".to_string()).error_type(), "not_found");
        assert_eq!(Error::Conflict("slug".to_string()).error_type(), "conflict");
        assert_eq!(Error::internal("test").error_type(), "internal_error");
    }

    #[test]
    fn test_error_retryable() {
        assert!(Error::database("test").is_retryable());
        assert!(Error::Timeout("test".to_string()).is_retryable());
        assert!(!Error::validation("test").is_retryable());
        assert!(!Error::Conflict("test".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::config("DATABASE_URL cannot be empty");
        assert_eq!(err.to_string(), "Configuration error: DATABASE_URL cannot be empty");
    }
}
