//! Generation request validation and credit accounting.

use thiserror::Error;

use crate::api::{SubmitRequest, User};

/// Longest text accepted for a single generation.
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Language used when the caller does not pick one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages offered for generation.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
];

/// Problems caught locally, before any request is sent.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter text to generate")]
    EmptyText,

    #[error("Please select a voice first")]
    NoVoiceSelected,

    #[error("Text is too long: {0} characters (maximum {MAX_TEXT_LENGTH})")]
    TextTooLong(usize),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("You have no remaining credits. Please contact support to add more credits.")]
    NoCredits,
}

/// Build a submit request from raw user input.
///
/// Text is trimmed; a missing or blank voice id counts as no selection.
pub fn validate_request(
    text: &str,
    voice_id: Option<&str>,
    language: Option<&str>,
) -> Result<SubmitRequest, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let voice_id = voice_id
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::NoVoiceSelected)?;

    let length = text.chars().count();
    if length > MAX_TEXT_LENGTH {
        return Err(ValidationError::TextTooLong(length));
    }

    let language = language.unwrap_or(DEFAULT_LANGUAGE);
    if !LANGUAGES.iter().any(|(code, _)| *code == language) {
        return Err(ValidationError::UnsupportedLanguage(language.to_string()));
    }

    Ok(SubmitRequest {
        text: text.to_string(),
        voice_id: voice_id.to_string(),
        language: language.to_string(),
    })
}

/// Credits a text will consume: one per started block of 100 characters.
pub fn credits_needed(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(100)
}

/// Whether the user has any credits left to spend.
pub fn can_generate(user: Option<&User>) -> bool {
    user.is_some_and(|u| u.remaining_credits() > 0)
}
