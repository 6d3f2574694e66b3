//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Slack webhooks
//! POST /events-endpoint        - Events API (handshake + message events)
//! POST /interactive-endpoint   - Button clicks on previews and prompts
//! ```

use axum::{Router, routing::get};

use crate::state::AppState;

pub mod events;
pub mod interactive;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(events::router())
        .merge(interactive::router())
}

/// Liveness probe.
async fn health() -> &'static str {
    "ok"
}
