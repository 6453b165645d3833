//! Login, registration and guest entry.

use crate::api::{Api, Credentials, User};
use crate::session::SessionStore;

use super::PanelError;
use super::errors::FormError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

fn credentials(email: &str, password: &str) -> Result<Credentials, FormError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FormError::MissingField("email"));
    }
    if password.is_empty() {
        return Err(FormError::MissingField("password"));
    }

    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Check the registration form before anything is sent.
pub fn validate_registration(password: &str, confirm_password: &str) -> Result<(), FormError> {
    if password != confirm_password {
        return Err(FormError::PasswordMismatch);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(FormError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Sign in and persist the session.
pub fn login<A: Api + ?Sized>(
    api: &A,
    session: &SessionStore,
    email: &str,
    password: &str,
) -> Result<User, PanelError> {
    let credentials = credentials(email, password)?;
    let response = api.login(&credentials)?;

    session.set_auth(&response.token, &response.user);
    tracing::info!(user_id = %response.user.id, "signed in");

    Ok(response.user)
}

/// Create an account and persist the session.
pub fn register<A: Api + ?Sized>(
    api: &A,
    session: &SessionStore,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<User, PanelError> {
    validate_registration(password, confirm_password)?;
    let credentials = credentials(email, password)?;
    let response = api.register(&credentials)?;

    session.set_auth(&response.token, &response.user);
    tracing::info!(user_id = %response.user.id, "account created");

    Ok(response.user)
}

/// Switch to guest mode, dropping any signed-in identity.
pub fn enter_guest(session: &SessionStore) -> Option<User> {
    session.set_guest();
    session.user()
}

pub fn logout(session: &SessionStore) {
    session.clear_auth();
}
