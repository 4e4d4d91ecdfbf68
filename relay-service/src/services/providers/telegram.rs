//! Telegram Bot API client.

use super::{Delivery, MessageSender, ProviderError};
use crate::config::TelegramConfig;
use crate::models::OutboundMessage;
use crate::services::metrics::record_upstream_latency;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use service_core::observability::TracedRequestExt;
use std::error::Error as _;
use std::time::Instant;

const SEND_MESSAGE_PATH: &str = "sendMessage";

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    send_message_url: Url,
    configured: bool,
}

/// Error envelope returned by the Bot API, e.g.
/// `{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}`.
#[derive(Debug, Deserialize)]
struct TelegramErrorResponse {
    description: Option<String>,
}

impl TelegramClient {
    /// Build a client for the configured bot. The send-message URL is
    /// resolved here so a malformed base URL fails at startup.
    pub fn new(config: &TelegramConfig) -> Result<Self, ProviderError> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &TelegramConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            send_message_url: send_message_url(&config.api_base_url())?,
            configured: config.is_configured(),
        })
    }
}

/// Append `sendMessage` to the base URL's path, tolerating a trailing slash.
pub fn send_message_url(base_url: &str) -> Result<Url, ProviderError> {
    // url::ParseError never echoes the input, which holds the bot token.
    let mut url = Url::parse(base_url).map_err(|e| {
        ProviderError::Configuration(format!("invalid Telegram API base URL: {}", e))
    })?;

    if url.cannot_be_a_base() {
        return Err(ProviderError::Configuration(
            "invalid Telegram API base URL: not a hierarchical URL".to_string(),
        ));
    }

    let path = format!("{}/{}", url.path().trim_end_matches('/'), SEND_MESSAGE_PATH);
    url.set_path(&path);

    Ok(url)
}

/// Caller-facing text for a failed request: the error chain without the
/// request URL.
fn connection_error_text(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn rejection_reason(body: &str) -> String {
    serde_json::from_str::<TelegramErrorResponse>(body)
        .ok()
        .and_then(|response| response.description)
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send(
        &self,
        message: &OutboundMessage,
        request_id: Option<&str>,
    ) -> Result<Delivery, ProviderError> {
        let start = Instant::now();
        let result = self
            .client
            .post(self.send_message_url.clone())
            .json(message)
            .with_trace_context(request_id)
            .send()
            .await;
        record_upstream_latency(start.elapsed());

        let response = result.map_err(|e| ProviderError::Connection(connection_error_text(e)))?;

        let status = response.status();
        if status == StatusCode::OK {
            tracing::info!(chat_id = %message.chat_id, "Message delivered via Telegram");
            return Ok(Delivery::Sent);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = rejection_reason(&body);

        tracing::warn!(
            status = %status,
            reason = %reason,
            chat_id = %message.chat_id,
            "Telegram rejected message"
        );

        Ok(Delivery::Rejected { status, reason })
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_with_and_without_trailing_slash() {
        assert_eq!(
            send_message_url("https://api.telegram.org/bot123:abc/")
                .unwrap()
                .as_str(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(
            send_message_url("https://api.telegram.org/bot123:abc")
                .unwrap()
                .as_str(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn joins_onto_bare_host() {
        assert_eq!(
            send_message_url("http://127.0.0.1:8081").unwrap().as_str(),
            "http://127.0.0.1:8081/sendMessage"
        );
    }

    #[test]
    fn invalid_base_url_does_not_leak_it() {
        let err = send_message_url("not a url bot123:secret").unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(!err.to_string().contains("secret"));
        assert!(err
            .to_string()
            .starts_with("invalid Telegram API base URL"));
    }

    #[test]
    fn opaque_url_is_rejected() {
        assert!(send_message_url("mailto:bot@example.com").is_err());
    }

    #[test]
    fn rejection_reason_prefers_telegram_description() {
        let body =
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        assert_eq!(rejection_reason(body), "Bad Request: chat not found");
    }

    #[test]
    fn rejection_reason_falls_back_to_raw_body() {
        assert_eq!(rejection_reason("Service Unavailable\n"), "Service Unavailable");
        assert_eq!(rejection_reason(""), "");
    }
}
