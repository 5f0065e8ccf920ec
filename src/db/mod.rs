//! Record store module for eventline
//!
//! This module provides database connectivity, schema migrations and the
//! repository implementations the validation pipelines write through.

pub mod booking_repo;
pub mod event_repo;
pub mod pool;
pub mod repository;

// Re-export commonly used types
pub use booking_repo::{BookingRepository, PgBookingRepository};
pub use event_repo::{EventRepository, PgEventRepository, EVENT_SLUG_CONSTRAINT};
pub use pool::{create_pool, DbPool, PoolMetrics};
pub use repository::{
    PersistRepository, Repository, RepositoryError, RepositoryResult, RetryConfig,
};

use sqlx::migrate::Migrator;

/// Database migrator for the events and bookings schema
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
