//! Unified error handling for webhook endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::slack::SlackError;

/// Request-level error type for the webhook endpoints.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request is malformed or unsigned.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request signature does not match.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SlackError> for AppError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::MalformedRequest(msg) => Self::BadRequest(msg),
            SlackError::InvalidSignature(msg) => Self::Unauthorized(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Webhook request error"
            );
        } else {
            tracing::warn!(error = %self, "Rejected webhook request");
        }

        // Error details stay in the logs
        status.into_response()
    }
}
