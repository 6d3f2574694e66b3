//! Newtype ID for Pivotal Tracker stories.
//!
//! Story IDs travel through free text, Slack button values, and the tracker
//! API, so they get a dedicated type instead of a bare integer.

use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pivotal Tracker story ID.
///
/// Serializes as a bare integer (`#[serde(transparent)]`).
///
/// # Example
///
/// ```rust
/// # use pivotal_preview_core::StoryId;
/// let id: StoryId = "172893694".parse().unwrap();
/// assert_eq!(id.as_i64(), 172_893_694);
/// assert_eq!(id.to_string(), "172893694");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(i64);

impl StoryId {
    /// Create a new ID from an i64 value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for StoryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<StoryId> for i64 {
    fn from(id: StoryId) -> Self {
        id.0
    }
}
