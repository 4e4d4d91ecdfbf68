//! service-core: Shared infrastructure for the relay's HTTP services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod utils;

pub use axum;
pub use serde_json;
pub use tower;
pub use tower_http;
pub use tracing;
