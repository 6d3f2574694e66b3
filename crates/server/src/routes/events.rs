//! Slack Events API webhook.
//!
//! Answers the URL verification handshake and hands message events to the
//! preview service in the background.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{debug, info_span, instrument};

use crate::error::AppError;
use crate::slack::{EventEnvelope, InnerEvent, SignatureVerifier};
use crate::state::AppState;

/// Create Events API routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/events-endpoint", post(handle_event))
}

/// Handle an Events API delivery.
///
/// The signature is checked before anything in the body is trusted.
#[instrument(skip_all)]
async fn handle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    SignatureVerifier::from_headers(&headers, state.signing_secret())?.ensure(&body)?;

    let envelope: EventEnvelope = serde_json::from_slice(&body)
        .map_err(|e| AppError::Internal(format!("Failed to parse event envelope: {e}")))?;

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            debug!("Answering URL verification");
            Ok(([(header::CONTENT_TYPE, "text/plain")], challenge).into_response())
        }
        EventEnvelope::EventCallback(callback) => {
            if let InnerEvent::Message(message) = callback.event {
                let span = info_span!(
                    "event",
                    event_id = callback.event_id.as_deref().unwrap_or_default()
                );
                let previews = state.previews().clone();

                span.in_scope(|| {
                    state.dispatcher().spawn(async move {
                        previews.handle_message(&message).await;
                    });
                });
            }
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::Other => Ok(StatusCode::OK.into_response()),
    }
}
