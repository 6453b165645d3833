//! Audio playback for voices and past generations.
//!
//! Only one item plays at a time: starting an item stops every other
//! cached sink first.

mod controller;
mod process;

pub use controller::{AudioSink, PlaybackController};
pub use process::{PlayerCommand, ProcessSink, WavInfo, wav_info};

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during playback.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Download failed: {0}")]
    Download(#[from] ApiError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Audio player failed to start: {0}")]
    PlayerFailed(String),
}
