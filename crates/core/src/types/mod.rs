//! Core types for the preview bridge.

pub mod id;
pub mod preview;
pub mod story;

pub use id::StoryId;
pub use preview::{CodecError, PreviewRequest};
pub use story::{Label, Story, StoryType};
