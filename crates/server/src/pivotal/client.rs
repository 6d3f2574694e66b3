//! Pivotal Tracker REST client.
//!
//! Fetches single stories by ID for preview rendering.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pivotal_preview_core::{Story, StoryId};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::PivotalError;
use crate::services::StoryFetcher;

/// Pivotal Tracker API base URL.
pub const PIVOTAL_API_BASE: &str = "https://www.pivotaltracker.com/services/v5";

/// Default timeout for a single story lookup.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pivotal Tracker API client.
#[derive(Clone)]
pub struct PivotalClient {
    inner: Arc<PivotalClientInner>,
}

struct PivotalClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for PivotalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PivotalClient")
            .field("api_token", &"[REDACTED]")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl PivotalClient {
    /// Create a new client against the public API.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(api_token: &SecretString) -> Result<Self, PivotalError> {
        Self::with_base_url(api_token, PIVOTAL_API_BASE)
    }

    /// Create a new client against a custom API base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn with_base_url(
        api_token: &SecretString,
        base_url: impl Into<String>,
    ) -> Result<Self, PivotalError> {
        Self::with_timeout(api_token, base_url, REQUEST_TIMEOUT)
    }

    /// Create a new client with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn with_timeout(
        api_token: &SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PivotalError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(api_token.expose_secret())
            .map_err(|e| PivotalError::Parse(format!("Invalid API token format: {e}")))?;
        token.set_sensitive(true);
        headers.insert("X-TrackerToken", token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(PivotalClientInner {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Fetch a story by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the story does not exist, or the
    /// response cannot be parsed.
    #[instrument(skip(self), fields(story_id = %id))]
    pub async fn get_story(&self, id: StoryId) -> Result<Story, PivotalError> {
        let url = format!("{}/stories/{id}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;

        let status = response.status();
        if status.is_success() {
            let story: Story = response
                .json()
                .await
                .map_err(|e| PivotalError::Parse(format!("Failed to parse story: {e}")))?;

            debug!(story_type = ?story.kind, "Story fetched");

            return Ok(story);
        }

        let message = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            404 => PivotalError::NotFound(format!("story {id}")),
            401 | 403 => PivotalError::Unauthorized,
            code => PivotalError::Api {
                status: code,
                message,
            },
        })
    }
}

#[async_trait]
impl StoryFetcher for PivotalClient {
    async fn fetch_story(&self, id: StoryId) -> Result<Story, PivotalError> {
        self.get_story(id).await
    }
}
