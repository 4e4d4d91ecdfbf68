pub mod telegram;

use crate::models::OutboundMessage;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use telegram::TelegramClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Configuration(String),

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Connection(String),
}

/// Result of a send that reached the messaging API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Rejected { status: StatusCode, reason: String },
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver one message. Exactly one upstream call, never retried.
    async fn send(
        &self,
        message: &OutboundMessage,
        request_id: Option<&str>,
    ) -> Result<Delivery, ProviderError>;

    fn is_configured(&self) -> bool;
}
