//! API request/response types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when an error response carries no readable body.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Errors that can occur when communicating with the API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Non-2xx response. `message` is what the user should see.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl ApiError {
    /// HTTP status of a server-side failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error body shapes the API may return.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Pick the message a user should see for a failed response.
    pub(crate) fn into_message(self, status: u16) -> String {
        if let Some(message) = self.message.filter(|m| !m.is_empty()) {
            return message;
        }
        match self.detail {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail,
            _ => format!("HTTP error! status: {status}"),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Account status as managed by administrators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Disabled,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Disabled => "disabled",
        }
    }
}

/// User profile. Replaced wholesale on every auth/profile response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub credits: i64,
    #[serde(default)]
    pub used_credits: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default)]
    pub status: AccountStatus,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Credits left to spend, never negative.
    pub fn remaining_credits(&self) -> i64 {
        (self.credits - self.used_credits).max(0)
    }
}

/// User record as seen by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub created_at: String,
}

/// Response from login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Credentials for login and register.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Lifecycle of a generation job. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// A single text-to-speech generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request body for `/tts/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub text: String,
    pub voice_id: String,
    pub language: String,
}

/// Past generation, read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub text: String,
    pub voice_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub created_at: String,
}

/// A cloned voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub created_at: String,
}

/// Request body for `/admin/update-subscription`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize_defaults_missing_fields() {
        let json = r#"{"id": "u1", "email": "a@x.com"}"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.credits, 0);
        assert_eq!(user.status, AccountStatus::Active);
        assert!(user.plan.is_none());
    }

    #[test]
    fn test_user_deserialize_camel_case() {
        let json = r#"{
            "id": "u2",
            "email": "admin@x.com",
            "role": "admin",
            "credits": 500,
            "usedCredits": 120,
            "subscriptionExpiry": "2030-01-01T00:00:00Z",
            "plan": "Pro",
            "status": "disabled"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_admin());
        assert_eq!(user.used_credits, 120);
        assert_eq!(user.remaining_credits(), 380);
        assert_eq!(user.status, AccountStatus::Disabled);
    }

    #[test]
    fn test_admin_user_flattens_profile() {
        let json = r#"{"id": "u3", "email": "b@y.com", "createdAt": "2024-05-01"}"#;

        let admin_user: AdminUser = serde_json::from_str(json).unwrap();
        assert_eq!(admin_user.user.email, "b@y.com");
        assert_eq!(admin_user.created_at, "2024-05-01");
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_update_subscription_skips_unset_fields() {
        let request = UpdateSubscriptionRequest {
            user_id: "u1".to_string(),
            credits: Some(50),
            ..Default::default()
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"userId": "u1", "credits": 50}));
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body = ErrorBody {
            message: Some("Invalid credentials".to_string()),
            detail: Some(serde_json::json!("ignored")),
        };
        assert_eq!(body.into_message(401), "Invalid credentials");
    }

    #[test]
    fn test_error_body_falls_back_to_detail_then_status() {
        let body = ErrorBody {
            message: None,
            detail: Some(serde_json::json!("Email already registered")),
        };
        assert_eq!(body.into_message(400), "Email already registered");

        let empty = ErrorBody::default();
        assert_eq!(empty.into_message(502), "HTTP error! status: 502");
    }
}
