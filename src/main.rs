//! Eventline - validation and persistence core for event listings
//!
//! The binary prepares the record store for the services that embed the
//! library: it loads configuration, applies schema migrations and reports
//! the state of the store.

use eventline::db::{
    self, pool, PgBookingRepository, PgEventRepository, PoolMetrics, Repository, RetryConfig,
};
use eventline::{logging, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;

    logging::init_tracing(&config.app)?;
    config.log_config();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting eventline");

    let pool = pool::create_pool(&config.database).await?;

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let retry = RetryConfig::from(&config.store);
    let events = PgEventRepository::with_retry_config(pool.clone(), retry.clone());
    let bookings = PgBookingRepository::with_retry_config(pool.clone(), retry);
    let metrics = PoolMetrics::from_pool(&pool);

    tracing::info!(
        events = events.count().await?,
        bookings = bookings.count().await?,
        connections = metrics.size,
        idle = metrics.idle,
        max_connections = metrics.max_size,
        "Record store ready"
    );

    pool.close().await;
    Ok(())
}
