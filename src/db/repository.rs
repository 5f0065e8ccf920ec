//! Repository abstractions for the eventline record store
//!
//! This module defines the repository traits the validation pipelines talk to
//! and the error type shared by every store implementation.

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use futures::future::BoxFuture;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write; holds the constraint name
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// Pool exhausted
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                RepositoryError::Conflict(constraint)
            },
            sqlx::Error::PoolTimedOut => RepositoryError::PoolExhausted,
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row not found".to_string()),
            other => RepositoryError::Database(other),
        }
    }
}

impl RepositoryError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RepositoryError::Connection(_)
            | RepositoryError::PoolExhausted
            | RepositoryError::Timeout(_) => true,
            RepositoryError::Database(e) => {
                matches!(
                    e,
                    sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_)
                )
            },
            _ => false,
        }
    }

    /// Check if this is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }

    /// Check if this conflict was raised by the named constraint
    pub fn is_conflict_on(&self, constraint: &str) -> bool {
        matches!(self, RepositoryError::Conflict(name) if name == constraint)
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

/// Convert repository errors to application errors
impl From<RepositoryError> for crate::error::Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => crate::error::Error::NotFound(msg),
            RepositoryError::Timeout(msg) => crate::error::Error::Timeout(msg),
            RepositoryError::Conflict(constraint) => crate::error::Error::Conflict(constraint),
            _ => crate::error::Error::database(err.to_string()),
        }
    }
}

/// Base repository trait
#[async_trait]
pub trait Repository: Send + Sync {
    /// The entity type this repository manages
    type Entity: Send + Sync;

    /// The ID type for the entity
    type Id: Send + Sync + Debug;

    /// Find an entity by ID
    async fn find_by_id(&self, id: Self::Id) -> RepositoryResult<Option<Self::Entity>>;

    /// Check if an entity exists without loading it
    async fn exists(&self, id: Self::Id) -> RepositoryResult<bool>;

    /// Delete an entity by ID
    async fn delete(&self, id: Self::Id) -> RepositoryResult<bool>;

    /// Count total entities
    async fn count(&self) -> RepositoryResult<i64>;

    /// Health check for the repository
    async fn health_check(&self) -> RepositoryResult<()>;
}

/// Repository that durably writes validated records
#[async_trait]
pub trait PersistRepository: Repository {
    /// Insert the entity, or replace the stored entity with the same id
    ///
    /// Uniqueness constraints are enforced atomically with the write and
    /// reported as [`RepositoryError::Conflict`]. Returns the stored entity.
    async fn persist(&self, entity: &Self::Entity) -> RepositoryResult<Self::Entity>;
}

/// Retry configuration for repository operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    pub max_backoff_ms: u64,
    /// Backoff multiplier
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 5000,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// A configuration that never retries
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Set the initial backoff
    pub fn with_initial_backoff(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    /// Set the maximum backoff
    pub fn with_max_backoff(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    /// Set the backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

impl From<&crate::config::StoreConfig> for RetryConfig {
    fn from(config: &crate::config::StoreConfig) -> Self {
        RetryConfig::new(config.max_retries)
            .with_initial_backoff(config.retry_base_ms)
            .with_max_backoff(config.retry_max_ms)
    }
}

/// Run a store operation, retrying transient failures with exponential backoff
///
/// Only errors for which [`RepositoryError::is_retryable`] holds are retried,
/// at most `config.max_retries` times. Everything else is returned as is.
pub(crate) async fn execute_with_retry<F, T>(
    config: &RetryConfig,
    operation: F,
) -> RepositoryResult<T>
where
    F: Fn() -> BoxFuture<'static, RepositoryResult<T>>,
{
    let backoff = ExponentialBackoff {
        current_interval: Duration::from_millis(config.initial_backoff_ms),
        initial_interval: Duration::from_millis(config.initial_backoff_ms),
        max_interval: Duration::from_millis(config.max_backoff_ms),
        multiplier: config.multiplier,
        max_elapsed_time: Some(Duration::from_secs(30)),
        ..Default::default()
    };
    let attempts = AtomicU32::new(0);

    retry(backoff, || async {
        match operation().await {
            Ok(value) => Ok(value),
            Err(e) if e.is_retryable() => {
                let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                if attempt > config.max_retries {
                    return Err(backoff::Error::permanent(e));
                }
                tracing::warn!(error = ?e, attempt, "Retrying database operation");
                Err(backoff::Error::transient(e))
            },
            Err(e) => Err(backoff::Error::permanent(e)),
        }
    })
    .await
}
