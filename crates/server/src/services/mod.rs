//! Business logic services for the preview bridge.
//!
//! # Services
//!
//! - `dispatch` - Fire-and-forget task spawning with graceful drain
//! - `ports` - Outbound capabilities (story lookup, chat posting)
//! - `preview` - Mention handling, confirmation prompts, and button actions

pub mod dispatch;
pub mod ports;
pub mod preview;

pub use dispatch::Dispatcher;
pub use ports::{ChatPoster, StoryFetcher};
pub use preview::{DEFAULT_ASK_THRESHOLD, PreviewService};
