//! Slack Block Kit types for building preview messages.
//!
//! These types represent the subset of the Slack Block Kit specification
//! used by story previews: sections (with optional fields and a button
//! accessory) and dividers.
//!
//! See: <https://api.slack.com/block-kit>

use serde::{Deserialize, Serialize};

/// Block Kit block types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Section block with text, fields, and optional accessory.
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Text>,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    /// Divider block (horizontal line).
    Divider,
}

impl Block {
    /// Section with markdown text only.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Section {
            text: Some(Text::mrkdwn(text)),
            fields: Vec::new(),
            accessory: None,
        }
    }

    /// Section with markdown text and a button accessory.
    #[must_use]
    pub fn text_with_button(text: impl Into<String>, button: Accessory) -> Self {
        Self::Section {
            text: Some(Text::mrkdwn(text)),
            fields: Vec::new(),
            accessory: Some(button),
        }
    }

    /// Section made of two-column markdown fields.
    #[must_use]
    pub fn fields(fields: Vec<Text>) -> Self {
        Self::Section {
            text: None,
            fields,
            accessory: None,
        }
    }
}

/// Text object types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Markdown text (supports formatting).
    Mrkdwn { text: String },
}

impl Text {
    /// Create a markdown text object.
    #[must_use]
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    /// The raw text content.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mrkdwn { text } => text,
        }
    }
}

/// Plain text object (for button labels).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlainText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl PlainText {
    /// Create a new plain text object.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text",
            text: text.into(),
            emoji: true,
        }
    }
}

/// Accessory elements for section blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessory {
    /// Button accessory.
    Button {
        text: PlainText,
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<ButtonStyle>,
    },
}

impl Accessory {
    /// Button with a label, action ID, and value.
    #[must_use]
    pub fn button(label: &str, action_id: &str, value: impl Into<String>) -> Self {
        Self::Button {
            text: PlainText::new(label),
            action_id: action_id.to_string(),
            value: Some(value.into()),
            style: None,
        }
    }

    /// Same button with a style applied.
    #[must_use]
    pub fn with_style(self, button_style: ButtonStyle) -> Self {
        match self {
            Self::Button {
                text,
                action_id,
                value,
                ..
            } => Self::Button {
                text,
                action_id,
                value,
                style: Some(button_style),
            },
        }
    }
}

/// Button style (affects color).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// Green primary button.
    Primary,
}

/// A message ready to post: blocks plus the thread it belongs to.
///
/// `thread_ts` is `None` for a new top-level message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub blocks: Vec<Block>,
    pub thread_ts: Option<String>,
}

impl RenderedMessage {
    /// Build a message, treating an empty thread timestamp as no thread.
    #[must_use]
    pub fn new(blocks: Vec<Block>, thread_ts: Option<&str>) -> Self {
        Self {
            blocks,
            thread_ts: thread_ts.filter(|ts| !ts.is_empty()).map(String::from),
        }
    }

    /// Number of divider blocks.
    #[must_use]
    pub fn divider_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::Divider))
            .count()
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Envelope shared by Web API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Channel ID the message went to.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp (`chat.postMessage`).
    #[serde(default)]
    pub ts: Option<String>,
    /// Message timestamp (`chat.postEphemeral`).
    #[serde(default)]
    pub message_ts: Option<String>,
    /// Error code if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// Interaction Types
// =============================================================================

/// Slack interaction payload from button clicks (`block_actions`).
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    /// Type of interaction.
    #[serde(rename = "type")]
    pub interaction_type: String,
    /// User who triggered the interaction.
    pub user: InteractionUser,
    /// Channel where interaction occurred.
    #[serde(default)]
    pub channel: Option<InteractionChannel>,
    /// Message carrying the clicked button (absent for ephemeral sources).
    #[serde(default)]
    pub message: Option<InteractionMessage>,
    /// Actions that were triggered.
    #[serde(default)]
    pub actions: Vec<InteractionAction>,
    /// Response URL for acting on the source message.
    #[serde(default)]
    pub response_url: Option<String>,
    /// Trigger ID for opening modals.
    #[serde(default)]
    pub trigger_id: Option<String>,
}

impl InteractionPayload {
    /// Channel ID, empty when Slack did not send one.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        self.channel.as_ref().map_or("", |channel| channel.id.as_str())
    }

    /// Thread of the message carrying the clicked button.
    #[must_use]
    pub fn thread_ts(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|message| message.thread_ts.as_deref())
    }

    /// Non-empty response URL.
    #[must_use]
    pub fn response_url(&self) -> Option<&str> {
        self.response_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// User who triggered an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    /// Slack user ID.
    pub id: String,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
}

/// Channel where interaction occurred.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionChannel {
    /// Channel ID.
    pub id: String,
}

/// Message that carried the interactive element.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionMessage {
    /// Message timestamp.
    #[serde(default)]
    pub ts: Option<String>,
    /// Thread the message belongs to.
    #[serde(default)]
    pub thread_ts: Option<String>,
}

/// Action that was triggered.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionAction {
    /// Action ID (set when creating the button).
    pub action_id: String,
    /// Block ID containing this action.
    #[serde(default)]
    pub block_id: Option<String>,
    /// Value attached to the action.
    #[serde(default)]
    pub value: Option<String>,
    /// Action type.
    #[serde(rename = "type", default)]
    pub action_type: String,
}
