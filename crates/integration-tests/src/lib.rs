//! Integration test helpers for the Pivotal preview bot.
//!
//! # Test Categories
//!
//! - `preview_messages` - Block Kit wire format of preview messages
//! - `webhooks` - Router behaviour with in-memory tracker and chat fakes
//! - `end_to_end` - Real API clients against mocked Slack and Pivotal servers
//!
//! Webhook requests are signed with [`SIGNING_SECRET`] the same way Slack
//! signs them, so they pass the server's verification.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use pivotal_preview_core::{Label, Story, StoryId, StoryType};
use pivotal_preview_server::pivotal::PivotalError;
use pivotal_preview_server::routes;
use pivotal_preview_server::services::{ChatPoster, Dispatcher, PreviewService, StoryFetcher};
use pivotal_preview_server::slack::{
    RenderedMessage, SIGNATURE_HEADER, SlackError, TIMESTAMP_HEADER, compute_signature,
};
use pivotal_preview_server::state::AppState;
use secrecy::SecretString;

/// Signing secret shared by the test server and the request helpers.
pub const SIGNING_SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

/// Build a story with predictable fields.
#[must_use]
pub fn story(id: i64) -> Story {
    Story {
        id: StoryId::new(id),
        name: format!("Story {id}"),
        url: format!("https://www.pivotaltracker.com/story/show/{id}"),
        kind: StoryType::Feature,
        state: "started".to_string(),
        description: format!("Description of {id}"),
        labels: vec![Label {
            name: "backend".to_string(),
        }],
    }
}

/// In-memory tracker returning [`story`] for every ID not marked missing.
#[derive(Default)]
pub struct FakeTracker {
    missing: HashSet<i64>,
    fetched: Mutex<Vec<StoryId>>,
}

impl FakeTracker {
    /// Tracker where `missing` IDs fail to fetch.
    #[must_use]
    pub fn with_missing(missing: &[i64]) -> Self {
        Self {
            missing: missing.iter().copied().collect(),
            fetched: Mutex::default(),
        }
    }

    /// IDs requested so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn fetched(&self) -> Vec<StoryId> {
        self.fetched.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl StoryFetcher for FakeTracker {
    async fn fetch_story(&self, id: StoryId) -> Result<Story, PivotalError> {
        self.fetched.lock().expect("lock poisoned").push(id);
        if self.missing.contains(&id.as_i64()) {
            return Err(PivotalError::NotFound(format!("story {id}")));
        }
        Ok(story(id.as_i64()))
    }
}

/// A call made to [`RecordingChat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    Message {
        channel: String,
        message: RenderedMessage,
    },
    Ephemeral {
        channel: String,
        user: String,
        message: RenderedMessage,
    },
    DeleteOriginal {
        response_url: String,
    },
}

/// Chat fake that records every call.
#[derive(Default)]
pub struct RecordingChat {
    calls: Mutex<Vec<ChatCall>>,
}

impl RecordingChat {
    /// Calls recorded so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    fn record(&self, call: ChatCall) {
        self.calls.lock().expect("lock poisoned").push(call);
    }
}

#[async_trait]
impl ChatPoster for RecordingChat {
    async fn post_message(&self, channel: &str, message: &RenderedMessage) -> Result<(), SlackError> {
        self.record(ChatCall::Message {
            channel: channel.to_string(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        message: &RenderedMessage,
    ) -> Result<(), SlackError> {
        self.record(ChatCall::Ephemeral {
            channel: channel.to_string(),
            user: user.to_string(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn delete_original(&self, response_url: &str) -> Result<(), SlackError> {
        self.record(ChatCall::DeleteOriginal {
            response_url: response_url.to_string(),
        });
        Ok(())
    }
}

/// Router wired to the given collaborators, plus its dispatcher.
pub struct TestApp {
    pub router: Router,
    pub dispatcher: Dispatcher,
}

impl TestApp {
    /// Build the application router around `stories` and `chat`.
    #[must_use]
    pub fn new(
        stories: Arc<dyn StoryFetcher>,
        chat: Arc<dyn ChatPoster>,
        ask_threshold: usize,
    ) -> Self {
        let dispatcher = Dispatcher::new();
        let previews = PreviewService::new(stories, chat, ask_threshold);
        let state = AppState::new(
            SecretString::from(SIGNING_SECRET.to_string()),
            previews,
            dispatcher.clone(),
        );

        Self {
            router: routes::routes().with_state(state),
            dispatcher,
        }
    }
}

/// Current Unix time as a header value.
///
/// # Panics
///
/// Panics if the system clock is before the Unix epoch.
#[must_use]
pub fn now_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs()
        .to_string()
}

/// POST `body` to `uri`, signed the way Slack signs webhook requests.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn signed_request(uri: &str, content_type: &str, body: &str) -> Request<Body> {
    let timestamp = now_timestamp();
    let signature = compute_signature(
        &SecretString::from(SIGNING_SECRET.to_string()),
        &timestamp,
        body.as_bytes(),
    )
    .expect("signature should compute");

    Request::post(uri)
        .header("content-type", content_type)
        .header(TIMESTAMP_HEADER, timestamp)
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Signed Events API request.
#[must_use]
pub fn event_request(body: &serde_json::Value) -> Request<Body> {
    signed_request("/events-endpoint", "application/json", &body.to_string())
}

/// Signed interactivity request carrying `payload` as a form field.
#[must_use]
pub fn interaction_request(payload: &serde_json::Value) -> Request<Body> {
    let form = format!("payload={}", urlencoding::encode(&payload.to_string()));
    signed_request(
        "/interactive-endpoint",
        "application/x-www-form-urlencoded",
        &form,
    )
}

/// `event_callback` envelope wrapping a message event.
#[must_use]
pub fn message_event(text: &str, thread_ts: Option<&str>) -> serde_json::Value {
    let mut event = serde_json::json!({
        "type": "message",
        "channel": "C123",
        "user": "U123",
        "text": text,
        "ts": "1700000000.000100",
    });
    if let (Some(ts), Some(object)) = (thread_ts, event.as_object_mut()) {
        object.insert("thread_ts".to_string(), ts.into());
    }

    serde_json::json!({
        "type": "event_callback",
        "team_id": "T123",
        "event_id": "Ev123",
        "event": event,
    })
}

/// `block_actions` payload with a single button click.
#[must_use]
pub fn button_payload(action_id: &str, value: &str, response_url: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "block_actions",
        "trigger_id": "1337.42",
        "user": {"id": "U999", "username": "jane"},
        "channel": {"id": "C123"},
        "message": {"ts": "1700000001.000200", "thread_ts": "1700000000.000100"},
        "response_url": response_url,
        "actions": [{
            "type": "button",
            "action_id": action_id,
            "block_id": "b1",
            "value": value,
        }],
    })
}
