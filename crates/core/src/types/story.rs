//! Stories as returned by the Pivotal Tracker v5 API.
//!
//! Only the fields the bridge renders are modelled. Stories are read-only:
//! nothing here is ever written back to the tracker.

use serde::{Deserialize, Serialize};

use super::id::StoryId;

/// Story type.
///
/// Maps to Pivotal's `story_type` values. Anything the bridge does not know
/// about deserializes to [`StoryType::Other`] and renders without an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    Feature,
    Bug,
    Chore,
    Release,
    #[serde(other)]
    Other,
}

impl StoryType {
    /// Slack emoji shortcode for this story type (empty for unknown types).
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Feature => ":star:",
            Self::Bug => ":beetle:",
            Self::Chore => ":gear:",
            Self::Release => ":checkered_flag:",
            Self::Other => "",
        }
    }
}

/// Story label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// A Pivotal Tracker story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub name: String,
    pub url: String,
    #[serde(rename = "story_type")]
    pub kind: StoryType,
    /// Lifecycle state (`unstarted`, `started`, `finished`, ...), kept free-form.
    #[serde(rename = "current_state")]
    pub state: String,
    /// Omitted by the API when empty.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Story {
    /// Label names joined with `", "`.
    #[must_use]
    pub fn label_names(&self) -> String {
        self.labels
            .iter()
            .map(|label| label.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
