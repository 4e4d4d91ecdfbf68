use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::observability::extract_request_id;
use service_core::utils::secret::secrets_match;
use validator::Validate;

use crate::models::{
    Notification, OutboundMessage, SendNotificationResponse, BODY_TOO_LARGE_ERROR,
    EMPTY_MESSAGE_ERROR, INVALID_BODY_ERROR,
};
use crate::services::{record_notification, Delivery, Outcome};
use crate::startup::AppState;

/// Header carrying the caller's shared secret.
pub const TOKEN_HEADER: &str = "token";

/// `POST /send-notification`
///
/// The body is taken as raw bytes so that the token is checked before any
/// decoding and callers are not required to send `Content-Type`. A body that
/// cannot be read (e.g. over the size limit) is reported only after the token
/// check, in the same JSON error shape.
#[tracing::instrument(skip_all)]
pub async fn send_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<SendNotificationResponse>), AppError> {
    if !is_authorized(&headers, state.config.auth.token.expose_secret()) {
        record_notification(Outcome::Unauthorized);
        tracing::warn!("Rejected notification with invalid token");
        return Err(AppError::Forbidden(anyhow!("invalid token")));
    }

    let notification = body
        .map_err(read_rejection)
        .and_then(|body| decode_notification(&body))
        .inspect_err(|_| {
            record_notification(Outcome::BadRequest);
        })?;

    let request_id = extract_request_id(&headers);
    let message = OutboundMessage::new(state.config.telegram.chat_id.clone(), notification);

    match state.sender.send(&message, request_id.as_deref()).await {
        Ok(Delivery::Sent) => {
            record_notification(Outcome::Sent);
            Ok((StatusCode::OK, Json(SendNotificationResponse::sent())))
        }
        Ok(Delivery::Rejected { status, reason }) => {
            record_notification(Outcome::Rejected);
            tracing::warn!(upstream_status = %status, "Notification rejected upstream");
            Ok((
                StatusCode::BAD_REQUEST,
                Json(SendNotificationResponse::rejected(reason)),
            ))
        }
        Err(e) => {
            record_notification(Outcome::UpstreamError);
            tracing::error!(error = %e, "Failed to reach messaging API");
            Err(AppError::UpstreamError(e.to_string()))
        }
    }
}

/// A missing header counts as an empty token.
fn is_authorized(headers: &HeaderMap, secret: &str) -> bool {
    let provided = headers
        .get(TOKEN_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    secrets_match(secret.as_bytes(), provided)
}

fn read_rejection(rejection: BytesRejection) -> AppError {
    tracing::debug!(error = %rejection.body_text(), "Unreadable notification body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(anyhow!(BODY_TOO_LARGE_ERROR))
    } else {
        AppError::BadRequest(anyhow!(INVALID_BODY_ERROR))
    }
}

fn decode_notification(body: &[u8]) -> Result<Notification, AppError> {
    let notification: Notification = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Undecodable notification body");
        AppError::BadRequest(anyhow!(INVALID_BODY_ERROR))
    })?;

    notification
        .validate()
        .map_err(|_| AppError::BadRequest(anyhow!(EMPTY_MESSAGE_ERROR)))?;

    Ok(notification)
}
