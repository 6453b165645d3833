//! Session store: token, profile and guest flag.

use std::sync::Arc;

use crate::api::{Role, User};

use super::storage::{DetachedRepository, SessionRepository};

pub const TOKEN_KEY: &str = "speechix_token";
pub const USER_KEY: &str = "speechix_user";
pub const GUEST_KEY: &str = "speechix_guest";

/// Fixed profile shown to guests.
pub fn synthetic_guest_profile() -> User {
    User {
        id: "guest".to_string(),
        email: "guest@speechix.com".to_string(),
        role: Role::User,
        credits: 100,
        used_credits: 0,
        subscription_expiry: None,
        plan: Some("Guest".to_string()),
        status: Default::default(),
    }
}

/// Client-side session. Clones share the same repository.
///
/// Holding a token and being a guest are mutually exclusive: `set_auth`
/// clears the guest flag and `set_guest` clears the token and profile.
#[derive(Clone)]
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
}

impl SessionStore {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// A store with no backing storage; every operation is a no-op.
    pub fn detached() -> Self {
        Self::new(Arc::new(DetachedRepository))
    }

    pub fn token(&self) -> Option<String> {
        self.repository.read(TOKEN_KEY)
    }

    /// Persisted profile, or the guest profile in guest mode.
    pub fn user(&self) -> Option<User> {
        if let Some(json) = self.repository.read(USER_KEY) {
            match serde_json::from_str(&json) {
                Ok(user) => return Some(user),
                Err(e) => tracing::warn!(error = %e, "ignoring unreadable persisted user"),
            }
        }

        self.is_guest().then(synthetic_guest_profile)
    }

    pub fn set_auth(&self, token: &str, user: &User) {
        self.repository.write(TOKEN_KEY, token);
        match serde_json::to_string(user) {
            Ok(json) => self.repository.write(USER_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize user"),
        }
        self.repository.remove(GUEST_KEY);
    }

    pub fn clear_auth(&self) {
        self.repository.remove(TOKEN_KEY);
        self.repository.remove(USER_KEY);
        self.repository.remove(GUEST_KEY);
    }

    /// True when a token is held or guest mode is on.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() || self.is_guest()
    }

    pub fn is_guest(&self) -> bool {
        self.repository.read(GUEST_KEY).as_deref() == Some("true")
    }

    pub fn set_guest(&self) {
        self.repository.write(GUEST_KEY, "true");
        self.repository.remove(TOKEN_KEY);
        self.repository.remove(USER_KEY);
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|user| user.is_admin())
    }
}
