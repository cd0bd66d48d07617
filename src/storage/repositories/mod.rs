//! Repository modules for data access
//!
//! Each repository handles the storage operations for one resource type.

pub mod account;
pub mod classification;

pub use account::{AccountRepository, SqlxAccountRepository};
pub use classification::{ClassificationRepository, SqlxClassificationRepository};
