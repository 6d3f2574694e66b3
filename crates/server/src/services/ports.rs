//! Outbound capabilities used by [`PreviewService`](super::PreviewService).
//!
//! The Slack and Pivotal clients implement these traits; tests substitute
//! in-memory fakes.

use async_trait::async_trait;
use pivotal_preview_core::{Story, StoryId};

use crate::pivotal::PivotalError;
use crate::slack::{RenderedMessage, SlackError};

/// Looks up stories in the tracker.
#[async_trait]
pub trait StoryFetcher: Send + Sync {
    /// Fetch a single story.
    async fn fetch_story(&self, id: StoryId) -> Result<Story, PivotalError>;
}

/// Posts messages to the chat platform.
#[async_trait]
pub trait ChatPoster: Send + Sync {
    /// Post a message to a channel (in a thread when the message has one).
    async fn post_message(&self, channel: &str, message: &RenderedMessage) -> Result<(), SlackError>;

    /// Post a message visible only to `user`.
    async fn post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        message: &RenderedMessage,
    ) -> Result<(), SlackError>;

    /// Delete the interactive message behind `response_url`.
    async fn delete_original(&self, response_url: &str) -> Result<(), SlackError>;
}
