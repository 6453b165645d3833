//! speechix-client: command-line front end for the Speechix voice cloning
//! and text-to-speech service.
//!
//! The library holds everything behind the `speechix` binary: the persisted
//! session, a typed client for the HTTP API, the generation polling task,
//! the dashboard panels and single-flight audio playback.

pub mod api;
pub mod cli;
pub mod config;
pub mod generation;
pub mod logging;
pub mod panels;
pub mod playback;
pub mod session;
