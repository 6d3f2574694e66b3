//! Events API envelope types.
//!
//! Slack posts two envelope kinds to the events endpoint:
//! - `url_verification` - handshake when the endpoint is configured
//! - `event_callback` - wraps the actual event (`message`, `app_mention`, ...)
//!
//! Only plain `message` events are modelled; every other inner event parses
//! as [`InnerEvent::Other`] and is ignored.

use serde::Deserialize;

/// Outer envelope delivered to the events endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Endpoint handshake; the challenge must be echoed back.
    UrlVerification { challenge: String },
    /// Event callback wrapping an inner event.
    EventCallback(CallbackEvent),
    /// Any other envelope type (e.g. `app_rate_limited`).
    #[serde(other)]
    Other,
}

/// `event_callback` envelope body.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackEvent {
    /// Unique event ID, used for log correlation.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Workspace ID.
    #[serde(default)]
    pub team_id: Option<String>,
    /// The wrapped event.
    pub event: InnerEvent,
}

/// Event wrapped by an `event_callback`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InnerEvent {
    /// Message posted in a channel the bot is in.
    Message(MessageEvent),
    /// Anything else.
    #[serde(other)]
    Other,
}

/// `message` event payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    /// Channel where the message was sent.
    #[serde(default)]
    pub channel: String,
    /// User who sent the message.
    #[serde(default)]
    pub user: Option<String>,
    /// Text of the message.
    #[serde(default)]
    pub text: String,
    /// Timestamp of the message.
    #[serde(default)]
    pub ts: String,
    /// Thread timestamp (if in a thread).
    #[serde(default)]
    pub thread_ts: Option<String>,
    /// Subtype of message (e.g., "bot_message").
    #[serde(default)]
    pub subtype: Option<String>,
    /// Bot ID (if message is from a bot).
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl MessageEvent {
    /// Check if this is a bot message (should be ignored).
    #[must_use]
    pub fn is_bot_message(&self) -> bool {
        self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message")
    }

    /// Thread timestamp, `None` when absent or empty.
    #[must_use]
    pub fn thread_ts(&self) -> Option<&str> {
        self.thread_ts.as_deref().filter(|ts| !ts.is_empty())
    }
}
