//! Pivotal Tracker API client.
//!
//! Read-only access to stories for rendering previews.
//!
//! # API Reference
//!
//! - Base URL: `https://www.pivotaltracker.com/services/v5`
//! - Authentication: API token via the `X-TrackerToken` header
//! - Story lookup: `GET /stories/{story_id}` (no project ID needed)

mod client;

pub use client::{PIVOTAL_API_BASE, PivotalClient};

use thiserror::Error;

/// Errors that can occur when interacting with the Pivotal Tracker API.
#[derive(Debug, Error)]
pub enum PivotalError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Story not found (or not visible to the token).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid API token).
    #[error("Unauthorized: invalid API token")]
    Unauthorized,
}
