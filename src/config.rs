//! Client configuration.
//!
//! Settings come from environment variables. A `.env` file in the working
//! directory is honoured outside of tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::Level;

use crate::generation::DEFAULT_POLL_INTERVAL;
use crate::playback::PlayerCommand;
use crate::session::{FileSessionRepository, SessionStore};

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server origin, e.g. `http://localhost:8000`.
    pub api_url: String,
    /// Path prefix for every endpoint.
    pub api_base: String,
    /// Where the session is persisted; `None` runs without storage.
    pub session_dir: Option<PathBuf>,
    pub poll_interval: Duration,
    pub log_level: Level,
    pub player: PlayerCommand,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("SPEECHIX_API_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        url::Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidValue("SPEECHIX_API_URL".to_string(), e.to_string())
        })?;

        let api_base = lookup("SPEECHIX_API_BASE").unwrap_or_else(|| "/api".to_string());

        let session_dir = lookup("SPEECHIX_SESSION_DIR")
            .map(PathBuf::from)
            .or_else(FileSessionRepository::default_dir);

        let poll_interval = match lookup("SPEECHIX_POLL_INTERVAL_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "SPEECHIX_POLL_INTERVAL_MS".to_string(),
                        format!("'{raw}' is not a positive number of milliseconds"),
                    ));
                }
            },
            None => DEFAULT_POLL_INTERVAL,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let player = match lookup("SPEECHIX_PLAYER") {
            Some(raw) => PlayerCommand::parse(&raw).ok_or_else(|| {
                ConfigError::InvalidValue("SPEECHIX_PLAYER".to_string(), "empty command".to_string())
            })?,
            None => PlayerCommand::platform_default(),
        };

        Ok(Self {
            api_url,
            api_base,
            session_dir,
            poll_interval,
            log_level,
            player,
        })
    }

    /// Session store backed by the configured directory.
    pub fn session_store(&self) -> SessionStore {
        match &self.session_dir {
            Some(dir) => SessionStore::new(Arc::new(FileSessionRepository::with_dir(dir.clone()))),
            None => {
                tracing::warn!("no session directory available; session will not persist");
                SessionStore::detached()
            }
        }
    }
}
