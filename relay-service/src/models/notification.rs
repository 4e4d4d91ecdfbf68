use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

pub const INVALID_BODY_ERROR: &str =
    "invalid request body: cannot parse body to Notification object";
pub const EMPTY_MESSAGE_ERROR: &str = "empty message passed";
pub const BODY_TOO_LARGE_ERROR: &str = "request body too large";

const SENT_MESSAGE: &str = "Notification has been sent.";
const NOT_SENT_MESSAGE: &str = "Notification cannot be sent.";

/// Inbound request body of `POST /send-notification`.
///
/// A body whose `message` is absent or `null` decodes to an empty message and
/// is then rejected by validation, not by the decoder. The key is also
/// accepted capitalized, as `Message`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Notification {
    #[serde(default, alias = "Message", deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub message: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload of the Bot API `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub text: String,
}

impl OutboundMessage {
    pub fn new(chat_id: impl Into<String>, notification: Notification) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: notification.message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendNotificationResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendNotificationResponse {
    pub fn sent() -> Self {
        Self {
            message: SENT_MESSAGE.to_string(),
            error: None,
        }
    }

    /// The upstream answered but refused the message. `error` is always
    /// present, possibly empty.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            message: NOT_SENT_MESSAGE.to_string(),
            error: Some(reason.into()),
        }
    }
}
