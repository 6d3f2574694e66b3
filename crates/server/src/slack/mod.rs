//! Slack integration for story previews.
//!
//! This module provides:
//! - [`SlackClient`] for posting channel and ephemeral messages
//! - Block Kit types and the preview message builders
//! - Events API and interaction payload types
//! - Request signature verification
//!
//! # Flow
//!
//! 1. Slack delivers a `message` event to `/events-endpoint`
//! 2. The signature is verified and story links are extracted
//! 3. A preview is posted, or the author is asked first when many stories are mentioned
//! 4. Button clicks arrive on `/interactive-endpoint` and expand or post the preview

mod client;
mod error;
mod events;
mod messages;
mod signature;
mod types;

pub use client::{SLACK_API_BASE, SlackClient};
pub use error::SlackError;
pub use events::{CallbackEvent, EventEnvelope, InnerEvent, MessageEvent};
pub use messages::{
    ACTION_POST_PREVIEW, ACTION_SHOW_MORE, build_description_message, build_preview_prompt,
    build_stories_message,
};
pub use signature::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER, compute_signature};
pub use types::{
    Accessory, Block, ButtonStyle, InteractionAction, InteractionChannel, InteractionMessage,
    InteractionPayload, InteractionUser, PlainText, RenderedMessage, Text,
};
