//! Access checks for protected pages.

use crate::session::SessionStore;

/// Result of checking whether a protected page may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    RedirectToLogin,
    /// Signed in, but the page needs an administrator.
    RedirectToApp,
}

pub fn check_access(session: &SessionStore, require_admin: bool) -> Access {
    if !session.is_authenticated() {
        return Access::RedirectToLogin;
    }

    if require_admin && !session.is_admin() {
        return Access::RedirectToApp;
    }

    Access::Granted
}
