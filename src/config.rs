//! Configuration module for eventline
//!
//! This module handles loading and validating configuration from environment
//! variables, providing strongly-typed configuration structures for the
//! record store and the ambient services around it.

use envconfig::Envconfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure for eventline
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct Config {
    /// Application configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub app: AppConfig,

    /// Database configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub database: DatabaseConfig,

    /// Record store behavior
    #[serde(flatten)]
    #[envconfig(nested)]
    pub store: StoreConfig,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct AppConfig {
    /// Log level
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Environment (development, staging, production)
    #[envconfig(from = "ENVIRONMENT", default = "development")]
    pub environment: String,
}

impl AppConfig {
    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[envconfig(from = "DATABASE_URL")]
    pub url: String,

    /// Maximum pool size
    #[envconfig(from = "DATABASE_POOL_MAX_SIZE", default = "10")]
    pub pool_max_size: u32,

    /// Minimum idle connections
    #[envconfig(from = "DATABASE_POOL_MIN_IDLE", default = "1")]
    pub pool_min_idle: u32,

    /// Pool timeout in seconds
    #[envconfig(from = "DATABASE_POOL_TIMEOUT_SECONDS", default = "30")]
    pub pool_timeout_seconds: u64,

    /// Idle timeout in seconds
    #[envconfig(from = "DATABASE_POOL_IDLE_TIMEOUT_SECONDS", default = "600")]
    pub pool_idle_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Get pool timeout as Duration
    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_seconds)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_seconds)
    }

    /// Mask password in URL for logging
    pub fn masked_url(&self) -> String {
        if let Some(at_pos) = self.url.rfind('@') {
            if let Some(scheme_end) = self.url.find("://") {
                let start = &self.url[..scheme_end + 3];
                let end = &self.url[at_pos..];
                return format!("{}***{}", start, end);
            }
        }
        "***".to_string()
    }
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct StoreConfig {
    /// Maximum retry attempts for transient store failures
    #[envconfig(from = "STORE_MAX_RETRIES", default = "3")]
    pub max_retries: u32,

    /// Base retry delay in milliseconds
    #[envconfig(from = "STORE_RETRY_BASE_MS", default = "100")]
    pub retry_base_ms: u64,

    /// Maximum retry delay in milliseconds
    #[envconfig(from = "STORE_RETRY_MAX_MS", default = "5000")]
    pub retry_max_ms: u64,

    /// Look up slug collisions before writing an event
    ///
    /// Only saves a round trip on the common collision path; the unique
    /// constraint stays authoritative either way.
    #[envconfig(from = "STORE_SLUG_PRECHECK", default = "false")]
    pub slug_precheck: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenv::dotenv().ok();

        Config::init_from_env().map_err(Error::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(Error::config("Database URL cannot be empty"));
        }

        if self.database.pool_max_size == 0 {
            return Err(Error::config("Database pool size must be at least 1"));
        }

        if self.database.pool_min_idle > self.database.pool_max_size {
            return Err(Error::config(
                "Database minimum idle connections cannot exceed the pool size",
            ));
        }

        if self.store.retry_base_ms > self.store.retry_max_ms {
            return Err(Error::config(
                "Store retry base delay cannot exceed the maximum delay",
            ));
        }

        Ok(())
    }

    /// Log configuration (with sensitive data masked)
    pub fn log_config(&self) {
        tracing::info!(
            environment = %self.app.environment,
            log_level = %self.app.log_level,
            "Application configuration"
        );

        tracing::info!(
            url = %self.database.masked_url(),
            pool_size = %self.database.pool_max_size,
            min_idle = %self.database.pool_min_idle,
            "Database configuration"
        );

        tracing::info!(
            max_retries = %self.store.max_retries,
            retry_base_ms = %self.store.retry_base_ms,
            retry_max_ms = %self.store.retry_max_ms,
            slug_precheck = %self.store.slug_precheck,
            "Record store configuration"
        );
    }
}
