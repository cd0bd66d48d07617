//! HTTP API layer: router, handlers, and the rendered-outcome contract
//! consumed by the external template renderer.

pub mod handlers;
pub mod outcome;
pub mod routes;
pub mod server;

pub use outcome::Outcome;
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
