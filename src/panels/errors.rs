//! Panel errors.

use thiserror::Error;

use crate::api::ApiError;

/// Form problems reported without a network round-trip.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter your {0}")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Please upload an audio file")]
    NotAudioFile,

    #[error("Audio file not found: {0}")]
    FileNotFound(String),

    #[error("Credits must be a whole number: {0}")]
    InvalidCredits(String),

    #[error("Subscription expiry must be a YYYY-MM-DD date: {0}")]
    InvalidExpiry(String),

    #[error("Please select a user first")]
    NoUserSelected,

    #[error("No audio file available")]
    NoAudio,
}

/// Errors surfaced by panels.
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("{0}")]
    Form(#[from] FormError),

    /// Server message shown verbatim.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Fixed message shown in place of the underlying failure.
    #[error("{message}")]
    Failed {
        message: &'static str,
        #[source]
        source: ApiError,
    },
}

impl PanelError {
    pub(crate) fn failed(message: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| {
            tracing::warn!(error = %source, "{message}");
            PanelError::Failed { message, source }
        }
    }
}
