//! Deferred preview requests and their button-value codec.
//!
//! When a message mentions several stories the bridge asks before posting.
//! Everything needed to finish the post later travels inside the "Post
//! preview" button value, so the encoded string is the only state that
//! survives until the click. There is no server-side copy and no expiry.
//!
//! Wire format (fixed, Slack echoes it back verbatim):
//!
//! ```json
//! {"channel":"C024BE91L","thread_ts":"","ids":[123,237]}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::StoryId;

/// Errors from encoding or decoding a [`PreviewRequest`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cannot serialize preview request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cannot parse preview request: {0}")]
    Decode(#[source] serde_json::Error),
}

/// State needed to post a preview after the user confirms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    channel: String,
    #[serde(default, with = "empty_as_none")]
    thread_ts: Option<String>,
    ids: Vec<StoryId>,
}

impl PreviewRequest {
    /// Create a request. An empty thread timestamp is treated as no thread.
    #[must_use]
    pub fn new(channel: impl Into<String>, thread_ts: Option<&str>, ids: Vec<StoryId>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: thread_ts.filter(|ts| !ts.is_empty()).map(String::from),
            ids,
        }
    }

    /// Channel the preview goes to.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Thread to reply in, never empty.
    #[must_use]
    pub fn thread_ts(&self) -> Option<&str> {
        self.thread_ts.as_deref()
    }

    /// Stories to preview, in mention order.
    #[must_use]
    pub fn ids(&self) -> &[StoryId] {
        &self.ids
    }

    /// Encode into a button value.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encode` if serialization fails.
    pub fn encode(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }

    /// Decode a button value produced by [`PreviewRequest::encode`].
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Decode` on malformed input.
    pub fn decode(value: &str) -> Result<Self, CodecError> {
        serde_json::from_str(value).map_err(CodecError::Decode)
    }
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)] // signature dictated by serde(with)
    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|ts| !ts.is_empty()))
    }
}
