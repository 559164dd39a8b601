//! Condor core.
//!
//! Watches a configured list of livestream URLs, emits online/offline
//! transition events from a background polling loop, and launches a media
//! player for a selected stream through the streamlink CLI.
//!
//! The core reads configuration through [`config::ConfigSource`] and never
//! writes it; how entries and settings are persisted is the embedder's
//! business (the shipped CLI keeps them in a TOML file).

pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod model;
pub mod monitor;

pub use error::{Error, Result};
