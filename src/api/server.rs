//! HTTP server startup and graceful shutdown.

use tokio::signal;
use tracing::info;

use crate::api::routes::{build_router, ApiState};
use crate::config::ServerConfig;
use crate::errors::{MotorlotError, Result};

/// Bind the configured address and serve the API until shutdown.
pub async fn start_api_server(config: &ServerConfig, state: ApiState) -> Result<()> {
    let router = build_router(state);
    let address = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        MotorlotError::internal_with_source(
            format!("Failed to bind API listener on {}", address),
            Box::new(e),
        )
    })?;

    info!(%address, "Account API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MotorlotError::internal_with_source("API server terminated", Box::new(e)))
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install CTRL+C signal handler");
    } else {
        info!("Shutdown signal received");
    }
}
