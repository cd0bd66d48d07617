//! # Configuration Management
//!
//! Immutable application configuration, constructed once at process start
//! and passed into the components that need it. Business logic never reads
//! the environment directly.

mod settings;

pub use settings::{AppConfig, AuthConfig, DatabaseConfig, ObservabilityConfig, ServerConfig};
