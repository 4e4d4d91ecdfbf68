//! HTTP handlers for relay-service.

pub mod health;
pub mod notification;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use notification::send_notification;
