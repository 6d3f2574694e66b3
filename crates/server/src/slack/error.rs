//! Slack-related errors.

use thiserror::Error;

/// Errors that can occur when interacting with Slack.
#[derive(Debug, Error)]
pub enum SlackError {
    /// HTTP request failed.
    #[error("Slack request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("Slack response error: {0}")]
    Response(String),

    /// Slack API returned an error.
    #[error("Slack API error: {0}")]
    Api(String),

    /// Signature headers are missing, malformed, or outside the replay window.
    #[error("Malformed Slack request: {0}")]
    MalformedRequest(String),

    /// Signature does not match the request body.
    #[error("Invalid Slack signature: {0}")]
    InvalidSignature(String),

    /// Failed to parse an event or interaction payload.
    #[error("Invalid Slack payload: {0}")]
    InvalidPayload(String),
}
