//! # Metrics Collection
//!
//! Counter helpers over the `metrics` facade. With the Prometheus exporter
//! enabled the counters are scraped from the configured listener; without it
//! the calls are no-ops.

use crate::errors::{MotorlotError, Result};
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(address: &str) -> Result<()> {
    let socket: SocketAddr = address
        .parse()
        .map_err(|e| MotorlotError::config(format!("Invalid metrics address '{}': {}", address, e)))?;

    PrometheusBuilder::new()
        .with_http_listener(socket)
        .install()
        .map_err(|e| MotorlotError::config(format!("Failed to install metrics exporter: {}", e)))?;

    describe_counter!("auth_attempts_total", "Authentication attempts by result");
    describe_counter!("authorization_denials_total", "Role/ownership denials by surface");
    describe_counter!("registrations_total", "Registration outcomes by result");
    describe_counter!("validation_failures_total", "Validation rejections by endpoint");

    info!(address, "Prometheus metrics exporter listening");
    Ok(())
}

/// Record an authentication attempt (login or token verification).
pub fn record_authentication(result: &'static str) {
    counter!("auth_attempts_total", "result" => result).increment(1);
}

/// Record a role or ownership denial.
pub fn record_authorization_denial(surface: &'static str) {
    counter!("authorization_denials_total", "surface" => surface).increment(1);
}

/// Record a registration outcome.
pub fn record_registration(result: &'static str) {
    counter!("registrations_total", "result" => result).increment(1);
}

/// Record a validation rejection for an endpoint.
pub fn record_validation_failure(endpoint: &'static str) {
    counter!("validation_failures_total", "endpoint" => endpoint).increment(1);
}
