//! Logging setup and tracing helpers for eventline
//!
//! Production emits JSON lines; every other environment gets the pretty
//! formatter. Store calls run inside a `record_store` span and each pipeline
//! save is timed, accepted or not.

use std::fmt::Display;
use std::time::{Duration, Instant};

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `LOG_LEVEL` when set.
pub fn init_tracing(app: &AppConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&app.log_level)));

    let production = app.is_production();
    let json_layer = production.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
    });
    let pretty_layer = (!production).then(|| {
        fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
    });

    Registry::default()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| Error::internal(format!("Failed to initialize tracing: {}", e)))?;

    tracing::info!(
        environment = %app.environment,
        log_level = %app.log_level,
        "Logging initialized"
    );

    Ok(())
}

fn default_directives(log_level: &str) -> String {
    format!("eventline={},sqlx=warn", log_level)
}

/// Span wrapping one record store call, e.g. `store_span!("events", "persist")`
#[macro_export]
macro_rules! store_span {
    ($table:expr, $operation:expr) => {
        tracing::info_span!("record_store", table = $table, operation = $operation)
    };
}

/// Measures one pipeline attempt
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn start(operation: &'static str) -> Self {
        Timer {
            start: Instant::now(),
            operation,
        }
    }

    /// Log the elapsed time together with the attempt's outcome
    pub fn finish<T, E: Display>(self, result: &std::result::Result<T, E>) -> Duration {
        let elapsed = self.start.elapsed();
        match result {
            Ok(_) => tracing::debug!(
                operation = self.operation,
                duration_ms = elapsed.as_millis() as u64,
                outcome = "accepted",
                "Pipeline attempt finished"
            ),
            Err(e) => tracing::debug!(
                operation = self.operation,
                duration_ms = elapsed.as_millis() as u64,
                outcome = "rejected",
                reason = %e,
                "Pipeline attempt finished"
            ),
        }
        elapsed
    }
}
