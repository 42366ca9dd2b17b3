//! Webhook endpoint handler.
//!
//! Verifies the delivery's signature, parses and classifies the event, and
//! queues the resulting work items before returning 202 Accepted. The actual
//! processing happens asynchronously on the single worker.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::webhooks::{ParseError, SignatureError, parse_webhook};
use crate::worker::{QueueClosed, classify};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// The worker has shut down.
    #[error("{0}")]
    QueueClosed(#[from] QueueClosed),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::QueueClosed(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (e.g., "issues", "release")
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature of the payload
/// - Optional: `X-GitHub-Delivery`, used only in logs
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 202 Accepted: Event queued, or ignored
/// - 400 Bad Request: Missing event header or malformed payload
/// - 401 Unauthorized: Missing or invalid signature
/// - 503 Service Unavailable: The worker is gone
///
/// Waits while the queue is full.
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let delivery_id = header(&headers, HEADER_DELIVERY).unwrap_or("-");

    // Verify the signature before anything looks at the body.
    if let Err(e) = app_state
        .webhook_secret()
        .verify(&body, header(&headers, HEADER_SIGNATURE))
    {
        warn!(delivery_id = %delivery_id, error = %e, "Rejected webhook");
        return Err(e.into());
    }

    let event_type =
        header(&headers, HEADER_EVENT).ok_or(WebhookError::MissingHeader(HEADER_EVENT))?;
    debug!(delivery_id = %delivery_id, event_type = %event_type, "Received webhook");

    let event = match parse_webhook(event_type, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring event");
            return Ok((StatusCode::ACCEPTED, "Ignored"));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Malformed webhook payload");
            return Err(e.into());
        }
    };

    let items = classify(event);
    let count = items.len();
    for item in items {
        debug!(item = %item, "Queueing work item");
        app_state.queue().enqueue(item).await?;
    }

    info!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        items = count,
        "Webhook accepted"
    );
    Ok((StatusCode::ACCEPTED, "Accepted"))
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
