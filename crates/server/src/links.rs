//! Pivotal Tracker story link extraction.
//!
//! Recognized link shapes (scheme and `www.` optional):
//!
//! ```text
//! pivotaltracker.com/story/show/<id>
//! pivotaltracker.com/n/story/show/<id>
//! pivotaltracker.com/projects/<project-id>/stories/<id>
//! pivotaltracker.com/n/projects/<project-id>/stories/<id>
//! ```

use std::sync::LazyLock;

use pivotal_preview_core::StoryId;
use regex::Regex;

static STORY_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pivotaltracker\.com(?:/n)?/(?:story/show|projects/\d+/stories)/(\d+)")
        .expect("story link pattern is valid")
});

/// Extract story IDs mentioned in `text`.
///
/// IDs come back in first-mention order without duplicates. If a captured ID
/// does not fit a [`StoryId`], extraction stops there and returns what was
/// collected so far.
#[must_use]
pub fn extract_story_ids(text: &str) -> Vec<StoryId> {
    let mut ids: Vec<StoryId> = Vec::new();

    for captures in STORY_LINK.captures_iter(text) {
        let Some(Ok(id)) = captures.get(1).map(|m| m.as_str().parse::<StoryId>()) else {
            break;
        };

        // Mentions per message are few, a linear scan is enough.
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    ids
}
