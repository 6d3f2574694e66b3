//! Pivotal Preview Core - Shared types library.
//!
//! This crate provides the domain types used by the preview bridge:
//! - [`StoryId`] and [`Story`] - read-only stories fetched from Pivotal Tracker
//! - [`PreviewRequest`] - deferred preview state carried inside a Slack button
//!
//! # Architecture
//!
//! The core crate contains only types and pure conversions - no I/O, no HTTP
//! clients. The Slack and Pivotal clients live in `pivotal-preview-server`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
