//! HTTP client for the Speechix API.

use std::path::Path;

use reqwest::Method;
use reqwest::blocking::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::session::SessionStore;

use super::Api;
use super::types::{
    AdminUser, ApiError, AuthResponse, Credentials, ErrorBody, GENERIC_ERROR_MESSAGE,
    GenerationJob, HistoryItem, SubmitRequest, UpdateSubscriptionRequest, User, Voice,
};

/// Whether a request carries the session's bearer token.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Anonymous,
}

/// HTTP-based API client.
pub struct HttpApi {
    origin: String,
    base_url: String,
    client: reqwest::blocking::Client,
    session: SessionStore,
}

impl HttpApi {
    /// Create a new client for `origin` (e.g. `http://localhost:8000`) and
    /// base path (e.g. `/api`).
    pub fn new(origin: &str, base_path: &str, session: SessionStore) -> Self {
        let base_url = format!(
            "{}/{}",
            origin.trim_end_matches('/'),
            base_path.trim_matches('/')
        );

        Self {
            origin: origin.trim_end_matches('/').to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
            session,
        }
    }

    /// Get the base URL for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an audio URL returned by the API, which may be relative to
    /// the server origin.
    pub fn resolve_url(&self, audio_url: &str) -> Result<String, ApiError> {
        let origin = url::Url::parse(&format!("{}/", self.origin))
            .map_err(|e| ApiError::RequestFailed(format!("Invalid API origin: {e}")))?;

        origin.join(audio_url).map(String::from).map_err(|e| {
            ApiError::InvalidResponse(format!("Invalid audio URL '{audio_url}': {e}"))
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn builder(&self, method: Method, endpoint: &str, auth: Auth) -> RequestBuilder {
        let mut builder = self.client.request(method, self.url(endpoint));

        if auth == Auth::Bearer
            && let Some(token) = self.session.token()
        {
            builder = builder.bearer_auth(token);
        }

        builder
    }

    /// Send a request and fail on any non-2xx status.
    fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>() {
            Ok(body) => body.into_message(status.as_u16()),
            Err(_) => GENERIC_ERROR_MESSAGE.to_string(),
        };
        tracing::debug!(status = status.as_u16(), %message, "request rejected");

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let builder = self.builder(Method::GET, endpoint, Auth::Bearer).query(query);

        self.send(builder)?
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let builder = self.builder(Method::POST, endpoint, auth).json(body);

        self.send(builder)?
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Guess an audio MIME type from a file extension.
pub fn audio_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "webm" => "audio/webm",
        _ => return None,
    };
    Some(mime)
}

impl Api for HttpApi {
    fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", credentials, Auth::Anonymous)
    }

    fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register", credentials, Auth::Anonymous)
    }

    fn me(&self) -> Result<User, ApiError> {
        self.get("/auth/me", &[])
    }

    fn submit(&self, request: &SubmitRequest) -> Result<GenerationJob, ApiError> {
        self.post("/tts/submit", request, Auth::Bearer)
    }

    fn status(&self, id: &str) -> Result<GenerationJob, ApiError> {
        self.get("/tts/status", &[("id", id)])
    }

    fn cancel(&self, id: &str) -> Result<(), ApiError> {
        let builder = self
            .builder(Method::POST, "/tts/cancel", Auth::Bearer)
            .json(&serde_json::json!({ "id": id }));

        // The body, if any, carries nothing we need.
        self.send(builder)?;
        Ok(())
    }

    fn history(&self) -> Result<Vec<HistoryItem>, ApiError> {
        self.get("/tts/history", &[])
    }

    fn upload_voice(&self, audio_path: &Path) -> Result<Voice, ApiError> {
        let audio_data = std::fs::read(audio_path)
            .map_err(|_| ApiError::FileNotFound(audio_path.display().to_string()))?;

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("voice.wav");
        let mime = audio_mime_type(audio_path).unwrap_or("application/octet-stream");

        let file_part = reqwest::blocking::multipart::Part::bytes(audio_data)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let form = reqwest::blocking::multipart::Form::new().part("file", file_part);

        let response = self
            .builder(Method::POST, "/voices/upload", Auth::Bearer)
            .multipart(form)
            .send()
            .map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Server {
                status: response.status().as_u16(),
                message: "Upload failed".to_string(),
            });
        }

        response
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    fn list_voices(&self) -> Result<Vec<Voice>, ApiError> {
        self.get("/voices/list", &[])
    }

    fn admin_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.get("/admin/users", &[])
    }

    fn admin_user(&self, id: &str) -> Result<AdminUser, ApiError> {
        self.get("/admin/user", &[("id", id)])
    }

    fn update_subscription(
        &self,
        request: &UpdateSubscriptionRequest,
    ) -> Result<AdminUser, ApiError> {
        self.post("/admin/update-subscription", request, Auth::Bearer)
    }
}

/// Download raw bytes from an absolute audio URL.
pub fn download(url: &str) -> Result<Vec<u8>, ApiError> {
    let response =
        reqwest::blocking::get(url).map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ApiError::RequestFailed(format!(
            "Download failed: {}",
            response.status()
        )));
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}
