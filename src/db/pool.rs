//! PostgreSQL connection pool for the record store

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

pub type DbPool = PgPool;

/// Connections are recycled after this long regardless of activity
const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(3600);

/// Health checks slower than this are logged as a warning
const SLOW_HEALTH_CHECK: Duration = Duration::from_secs(1);

/// Connect to PostgreSQL and confirm the connection works
///
/// Statements are logged at debug level and the connection is tagged with
/// `application_name = eventline` so it shows up in `pg_stat_activity`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let connect_options = PgConnectOptions::from_str(&config.url)
        .map_err(|e| {
            Error::config(format!("Invalid database URL {}: {}", config.masked_url(), e))
        })?
        .application_name("eventline")
        .log_statements(tracing::log::LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(config.pool_max_size)
        .min_connections(config.pool_min_idle)
        .acquire_timeout(config.pool_timeout())
        .idle_timeout(Some(config.idle_timeout()))
        .max_lifetime(Some(MAX_CONNECTION_LIFETIME))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .map_err(|e| Error::database(format!("Failed to connect to record store: {}", e)))?;

    health_check(&pool).await?;

    tracing::info!(
        url = %config.masked_url(),
        max_connections = config.pool_max_size,
        min_idle = config.pool_min_idle,
        "Record store pool created"
    );

    Ok(pool)
}

/// Run a trivial query through the pool
pub async fn health_check(pool: &DbPool) -> Result<()> {
    let started = Instant::now();

    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| Error::database(format!("Record store health check failed: {}", e)))?;

    let elapsed = started.elapsed();
    if elapsed > SLOW_HEALTH_CHECK {
        tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "Record store health check slow");
    }

    Ok(())
}

/// Point-in-time view of pool usage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolMetrics {
    /// Open connections, idle or not
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
}

impl PoolMetrics {
    pub fn from_pool(pool: &DbPool) -> Self {
        Self {
            size: pool.size(),
            idle: pool.num_idle() as u32,
            max_size: pool.options().get_max_connections(),
        }
    }

    pub fn in_use(&self) -> u32 {
        self.size.saturating_sub(self.idle)
    }

    /// A connection can be handed out without waiting
    pub fn has_capacity(&self) -> bool {
        self.idle > 0 || self.size < self.max_size
    }

    /// Share of `max_size` in use, as a percentage
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }
        f64::from(self.in_use()) / f64::from(self.max_size) * 100.0
    }
}
