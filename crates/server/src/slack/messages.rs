//! Slack message builders for story previews.
//!
//! Provides factory functions for building Block Kit messages for:
//! - Story previews (one header + facts pair per story)
//! - Full story descriptions (the "Show more" expansion)
//! - The "post a preview?" prompt shown when many stories are mentioned
//!
//! All builders are pure. The thread timestamp is carried on the returned
//! [`RenderedMessage`] so replies land in the thread they were triggered from.

use pivotal_preview_core::{CodecError, PreviewRequest, Story};

use super::types::{Accessory, Block, ButtonStyle, RenderedMessage, Text};

/// Action ID of the per-story "Show more" button.
pub const ACTION_SHOW_MORE: &str = "show_more";

/// Action ID of the "Post preview" confirmation button.
pub const ACTION_POST_PREVIEW: &str = "post_preview";

const PREVIEW_PROMPT: &str = "Last message refers to multiple stories, post a preview?";

/// Build a preview message for one or more stories.
///
/// Each story renders as:
/// - Header line linking to the story, with a "Show more" button
/// - State and labels as two fields
///
/// Stories are separated by dividers when there is more than one.
#[must_use]
pub fn build_stories_message(stories: &[Story], thread_ts: Option<&str>) -> RenderedMessage {
    let mut blocks = Vec::with_capacity(stories.len() * 3);

    for (index, story) in stories.iter().enumerate() {
        if index > 0 {
            blocks.push(Block::Divider);
        }

        blocks.push(Block::text_with_button(
            story_header(story),
            Accessory::button("Show more", ACTION_SHOW_MORE, story.id.to_string()),
        ));
        blocks.push(Block::fields(vec![
            Text::mrkdwn(format!("*State:*\n{}", story.state)),
            Text::mrkdwn(format!("*Labels:*\n{}", story.label_names())),
        ]));
    }

    RenderedMessage::new(blocks, thread_ts)
}

/// Build the full description message for a single story.
///
/// The description section is left out when the story has no description.
#[must_use]
pub fn build_description_message(story: &Story, thread_ts: Option<&str>) -> RenderedMessage {
    let mut blocks = vec![Block::text(story_header(story))];

    if !story.description.is_empty() {
        blocks.push(Block::text(story.description.clone()));
    }

    RenderedMessage::new(blocks, thread_ts)
}

/// Build the prompt asking whether a preview should be posted.
///
/// The "Post preview" button carries the encoded [`PreviewRequest`].
///
/// # Errors
///
/// Returns `CodecError` if the request cannot be encoded.
pub fn build_preview_prompt(
    request: &PreviewRequest,
    thread_ts: Option<&str>,
) -> Result<RenderedMessage, CodecError> {
    let value = request.encode()?;

    let button = Accessory::button("Post preview", ACTION_POST_PREVIEW, value)
        .with_style(ButtonStyle::Primary);

    Ok(RenderedMessage::new(
        vec![Block::text_with_button(PREVIEW_PROMPT, button)],
        thread_ts,
    ))
}

/// Bold link line followed by the story name.
fn story_header(story: &Story) -> String {
    format!(
        "*<{}|{} #{}>*\n{}",
        story.url,
        story.kind.emoji(),
        story.id,
        story.name
    )
}
