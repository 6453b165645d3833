//! Communication with the Speechix HTTP API.
//!
//! Provides the [`Api`] trait with one method per endpoint and an
//! HTTP implementation that attaches the session's bearer token.

mod client;
mod types;

pub use client::{HttpApi, audio_mime_type, download};
pub use types::{
    AccountStatus, AdminUser, ApiError, AuthResponse, Credentials, GENERIC_ERROR_MESSAGE,
    GenerationJob, HistoryItem, JobStatus, Role, SubmitRequest, UpdateSubscriptionRequest, User,
    Voice,
};

use std::path::Path;

/// Trait for Speechix API communication.
///
/// This trait abstracts the HTTP calls so that controllers and panels can
/// be exercised against mock implementations in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Api: Send + Sync {
    /// `POST /auth/login`
    fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    /// `POST /auth/register`
    fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    /// `GET /auth/me`
    fn me(&self) -> Result<User, ApiError>;

    /// Submit a generation job.
    ///
    /// # Returns
    /// The job id and its initial status
    fn submit(&self, request: &SubmitRequest) -> Result<GenerationJob, ApiError>;

    /// Query the current status of a job.
    fn status(&self, id: &str) -> Result<GenerationJob, ApiError>;

    /// Ask the service to cancel a job.
    fn cancel(&self, id: &str) -> Result<(), ApiError>;

    /// List past generations.
    fn history(&self) -> Result<Vec<HistoryItem>, ApiError>;

    /// Upload a reference recording as a new voice.
    ///
    /// # Arguments
    /// * `audio_path` - Path to the audio file, sent as multipart field `file`
    fn upload_voice(&self, audio_path: &Path) -> Result<Voice, ApiError>;

    /// List the caller's voices.
    fn list_voices(&self) -> Result<Vec<Voice>, ApiError>;

    fn admin_users(&self) -> Result<Vec<AdminUser>, ApiError>;

    fn admin_user(&self, id: &str) -> Result<AdminUser, ApiError>;

    fn update_subscription(
        &self,
        request: &UpdateSubscriptionRequest,
    ) -> Result<AdminUser, ApiError>;
}
