//! # Motorlot
//!
//! Motorlot is the account and access-control backend for a vehicle
//! dealership catalog: credential handling, stateless bearer tokens carried
//! in an HTTP-only cookie, a best-effort session mirror for view rendering,
//! role-gated routes, and an ordered collect-all validation pipeline in
//! front of every mutating flow.
//!
//! ## Architecture
//!
//! ```text
//! HTTP request → resolve_identity → route guards → validation rules → flow
//!                     ↓                                    ↓
//!               Token Service                     Account Repository
//! ```
//!
//! View rendering, catalog browsing, and static assets are external
//! collaborators: handlers return a rendered-outcome description (view name,
//! status, notice, field errors, sticky form) or a redirect target.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod inventory;
pub mod observability;
pub mod storage;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{MotorlotError, Result};
pub use observability::init_observability;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
