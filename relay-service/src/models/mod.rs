pub mod notification;

pub use notification::{
    Notification, OutboundMessage, SendNotificationResponse, BODY_TOO_LARGE_ERROR,
    EMPTY_MESSAGE_ERROR, INVALID_BODY_ERROR,
};
