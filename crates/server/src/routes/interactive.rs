//! Slack interactivity webhook.
//!
//! Handles clicks on the "Show more" and "Post preview" buttons. Slack gets
//! a 200 in every case; failures are only logged.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use tracing::{debug, info_span, instrument, warn};

use crate::slack::{InteractionPayload, SignatureVerifier, SlackError};
use crate::state::AppState;

/// Create interactivity routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/interactive-endpoint", post(handle_interaction))
}

/// Handle a Slack interaction webhook.
#[instrument(skip_all)]
async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let verified = SignatureVerifier::from_headers(&headers, state.signing_secret())
        .and_then(|verifier| verifier.ensure(&body));
    if let Err(e) = verified {
        warn!(error = %e, "Dropping unauthenticated interaction");
        return StatusCode::OK;
    }

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Cannot parse interaction payload");
            return StatusCode::OK;
        }
    };

    debug!(
        interaction_type = %payload.interaction_type,
        actions = payload.actions.len(),
        "Interaction received"
    );

    let span = info_span!(
        "interaction",
        trigger_id = payload.trigger_id.as_deref().unwrap_or_default()
    );

    span.in_scope(|| {
        for action in payload.actions.clone() {
            let previews = state.previews().clone();
            let payload = payload.clone();

            state.dispatcher().spawn(async move {
                previews.handle_action(&payload, &action).await;
            });
        }
    });

    StatusCode::OK
}

/// Extract the JSON `payload` field from a form-encoded body.
fn parse_payload(body: &[u8]) -> Result<InteractionPayload, SlackError> {
    let body = std::str::from_utf8(body)
        .map_err(|e| SlackError::InvalidPayload(format!("Body is not UTF-8: {e}")))?;

    let encoded = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("payload="))
        .ok_or_else(|| SlackError::InvalidPayload("Missing payload field".into()))?;

    // Form encoding uses '+' for spaces
    let encoded = encoded.replace('+', " ");
    let json = urlencoding::decode(&encoded)
        .map_err(|e| SlackError::InvalidPayload(format!("Failed to decode payload: {e}")))?;

    serde_json::from_str(&json)
        .map_err(|e| SlackError::InvalidPayload(format!("Failed to parse payload: {e}")))
}
