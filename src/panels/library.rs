//! Voice studio and generation history listings.

use std::path::Path;

use crate::api::{Api, HistoryItem, Voice, audio_mime_type};

use super::errors::{FormError, PanelError};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NO_HISTORY_MESSAGE: &str = "No generation history yet";
pub const NO_VOICES_MESSAGE: &str = "No voices yet. Upload a recording to get started.";

pub fn load_history<A: Api + ?Sized>(api: &A) -> Result<Vec<HistoryItem>, PanelError> {
    api.history()
        .map_err(PanelError::failed("Failed to load history"))
}

pub fn load_voices<A: Api + ?Sized>(api: &A) -> Result<Vec<Voice>, PanelError> {
    api.list_voices()
        .map_err(PanelError::failed("Failed to load voices"))
}

/// Check a file before uploading it as a voice.
pub fn validate_upload(path: &Path) -> Result<(), FormError> {
    if !path.is_file() {
        return Err(FormError::FileNotFound(path.display().to_string()));
    }
    if audio_mime_type(path).is_none() {
        return Err(FormError::NotAudioFile);
    }
    Ok(())
}

pub fn upload_voice<A: Api + ?Sized>(api: &A, path: &Path) -> Result<Voice, PanelError> {
    validate_upload(path)?;

    let voice = api
        .upload_voice(path)
        .map_err(PanelError::failed("Upload failed. Please try again."))?;
    tracing::info!(voice_id = %voice.id, "voice uploaded");

    Ok(voice)
}

/// Local file name for a downloaded generation.
pub fn download_file_name(item: &HistoryItem) -> Result<String, FormError> {
    if item.audio_url.as_deref().is_none_or(str::is_empty) {
        return Err(FormError::NoAudio);
    }
    Ok(format!("speechix-{}.mp3", item.id))
}

/// Look up a history item by id.
pub fn find_history_item<'a>(items: &'a [HistoryItem], id: &str) -> Option<&'a HistoryItem> {
    items.iter().find(|item| item.id == id)
}

pub fn find_voice<'a>(voices: &'a [Voice], id: &str) -> Option<&'a Voice> {
    voices.iter().find(|voice| voice.id == id)
}
