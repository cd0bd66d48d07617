//! # Observability
//!
//! Structured logging via the tracing ecosystem and application metrics via
//! the `metrics` facade with an optional Prometheus exporter.

pub mod metrics;

use crate::config::ObservabilityConfig;
use crate::errors::{MotorlotError, Result};
use tracing_subscriber::EnvFilter;

/// Initialize logging and (optionally) the metrics exporter.
///
/// Must be called once, early in process startup, from within the tokio
/// runtime when metrics are enabled.
pub fn init_observability(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| MotorlotError::config(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let init_result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = init_result {
        // Re-initialization happens in tests; not a startup failure.
        tracing::debug!(error = %e, "tracing subscriber already initialized");
    }

    if let Some(address) = config.metrics_bind_address() {
        metrics::init_metrics(&address)?;
    }

    Ok(())
}
