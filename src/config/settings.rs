//! # Configuration Settings
//!
//! Defines the configuration structure for the Motorlot backend.

use crate::errors::{MotorlotError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self).map_err(MotorlotError::from)?;
        self.validate_custom()
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite://") && !self.database.url.starts_with("sqlite:")
        {
            return Err(MotorlotError::validation("Database URL must start with 'sqlite:'"));
        }

        if self.auth.jwt_secret.len() < 32 {
            return Err(MotorlotError::validation(
                "JWT secret must be at least 32 characters long",
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("MOTORLOT_HOST").unwrap_or(defaults.host),
            port: std::env::var("MOTORLOT_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(min = 0, max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/motorlot.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Create DatabaseConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            url: std::env::var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_connections),
            connect_timeout_seconds: std::env::var("DATABASE_CONNECT_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.connect_timeout_seconds),
            idle_timeout_seconds: std::env::var("DATABASE_IDLE_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.idle_timeout_seconds),
            auto_migrate: std::env::var("DATABASE_AUTO_MIGRATE")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.auto_migrate),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// Secret used to sign and verify bearer tokens
    #[validate(length(min = 1, message = "JWT secret cannot be empty"))]
    pub jwt_secret: String,

    /// Token lifetime in seconds
    #[validate(range(min = 60, message = "Token TTL must be at least 60 seconds"))]
    pub token_ttl_seconds: u64,

    /// Production flag; when set the auth cookie is marked `Secure`
    pub production: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "motorlot-default-secret-please-change-in-production".to_string(),
            token_ttl_seconds: 3600,
            production: false,
        }
    }
}

impl AuthConfig {
    /// Get the token lifetime as Duration
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }

    fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let token_ttl_seconds = match std::env::var("MOTORLOT_TOKEN_TTL_SECONDS") {
            Ok(raw) => raw.parse().map_err(|e| {
                MotorlotError::config(format!("Invalid MOTORLOT_TOKEN_TTL_SECONDS: {}", e))
            })?,
            Err(_) => defaults.token_ttl_seconds,
        };

        Ok(Self {
            jwt_secret: std::env::var("MOTORLOT_ACCESS_TOKEN_SECRET")
                .unwrap_or(defaults.jwt_secret),
            token_ttl_seconds,
            production: std::env::var("MOTORLOT_ENV")
                .map(|s| s.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        })
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log filter directive (tracing env-filter syntax)
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable text
    pub json_logs: bool,

    /// Enable the Prometheus metrics exporter
    pub enable_metrics: bool,

    /// Metrics exporter bind port
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            enable_metrics: false,
            metrics_port: 9090,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("MOTORLOT_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: std::env::var("MOTORLOT_JSON_LOGS")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.json_logs),
            enable_metrics: std::env::var("MOTORLOT_ENABLE_METRICS")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.enable_metrics),
            metrics_port: std::env::var("MOTORLOT_METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.metrics_port),
        }
    }

    /// Get the metrics bind address, if the exporter is enabled
    pub fn metrics_bind_address(&self) -> Option<String> {
        if self.enable_metrics {
            Some(format!("127.0.0.1:{}", self.metrics_port))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_bind_address() {
        let config = ServerConfig { host: "0.0.0.0".to_string(), port: 8080 };
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn database_config_timeouts() {
        let config =
            DatabaseConfig { connect_timeout_seconds: 5, idle_timeout_seconds: 30, ..Default::default() };
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(30)));

        let no_idle = DatabaseConfig { idle_timeout_seconds: 0, ..Default::default() };
        assert_eq!(no_idle.idle_timeout(), None);
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn non_sqlite_url_is_rejected() {
        let mut config = AppConfig::default();
        config.database.url = "postgresql://localhost/motorlot".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate_all().is_ok());
    }

    #[test]
    fn metrics_bind_address_follows_enable_flag() {
        let mut config = ObservabilityConfig::default();
        assert_eq!(config.metrics_bind_address(), None);
        config.enable_metrics = true;
        config.metrics_port = 9466;
        assert_eq!(config.metrics_bind_address(), Some("127.0.0.1:9466".to_string()));
    }
}
