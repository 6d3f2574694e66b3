//! Pivotal preview bot library.
//!
//! Watches Slack messages for Pivotal Tracker story links and posts a
//! preview of each mentioned story. Exposed as a library so the router and
//! services can be exercised by the integration tests.
//!
//! # Modules
//!
//! - `links` - story link extraction
//! - `slack` - Block Kit types, message builders, signatures, Web API client
//! - `pivotal` - Pivotal Tracker API client
//! - `services` - preview orchestration and background dispatch
//! - `routes` - webhook endpoints

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod links;
pub mod pivotal;
pub mod routes;
pub mod services;
pub mod slack;
pub mod state;
