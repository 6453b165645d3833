//! Dashboard profile loading.

use crate::api::{Api, User};
use crate::session::SessionStore;

/// Outcome of loading the signed-in profile for a protected page.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLoad {
    Loaded(User),
    /// The session was cleared; the caller should show the login page.
    RedirectToLogin { message: String },
}

/// Load the current profile.
///
/// Guests get their synthetic profile without a network call. For everyone
/// else the server profile replaces the stored one; if it cannot be
/// fetched the session is cleared.
pub fn load_profile<A: Api + ?Sized>(api: &A, session: &SessionStore) -> ProfileLoad {
    if session.is_guest() {
        return match session.user() {
            Some(user) => ProfileLoad::Loaded(user),
            None => ProfileLoad::RedirectToLogin {
                message: "Failed to load user data".to_string(),
            },
        };
    }

    match api.me() {
        Ok(user) => {
            if let Some(token) = session.token() {
                session.set_auth(&token, &user);
            }
            ProfileLoad::Loaded(user)
        }
        Err(e) => {
            tracing::warn!(error = %e, "profile refresh failed, signing out");
            session.clear_auth();
            ProfileLoad::RedirectToLogin {
                message: "Failed to load user data".to_string(),
            }
        }
    }
}
