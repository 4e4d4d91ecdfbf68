pub mod metrics;
pub mod providers;

pub use metrics::{get_metrics, init_metrics, record_notification, record_upstream_latency, Outcome};
pub use providers::{Delivery, MessageSender, ProviderError, TelegramClient};
