//! Admin panel: user search and subscription management.

use crate::api::{AccountStatus, AdminUser, Api, UpdateSubscriptionRequest};

use super::errors::{FormError, PanelError};
use super::usage::parse_expiry;

pub const LOADING_USERS_MESSAGE: &str = "Loading users...";
pub const NO_USERS_MESSAGE: &str = "No users yet";
pub const NO_MATCHING_USERS_MESSAGE: &str = "No users found";

/// Users whose email contains `query`, ignoring case. A blank query keeps everyone.
///
/// Surrounding whitespace is part of a non-blank query.
pub fn filter_users<'a>(users: &'a [AdminUser], query: &str) -> Vec<&'a AdminUser> {
    if query.trim().is_empty() {
        return users.iter().collect();
    }

    let query = query.to_lowercase();
    users
        .iter()
        .filter(|u| u.user.email.to_lowercase().contains(&query))
        .collect()
}

/// Swap an updated record into the list, matched by id.
pub fn replace_user(users: &mut [AdminUser], updated: &AdminUser) {
    for user in users.iter_mut().filter(|u| u.user.id == updated.user.id) {
        *user = updated.clone();
    }
}

/// Editable subscription fields, as typed by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionForm {
    /// Blank leaves credits unchanged.
    pub credits: String,
    /// `YYYY-MM-DD`; blank leaves the expiry unchanged.
    pub subscription_expiry: String,
    pub status: AccountStatus,
}

impl SubscriptionForm {
    /// Prefill the form from a user record.
    pub fn from_user(user: &AdminUser) -> Self {
        let subscription_expiry = user
            .user
            .subscription_expiry
            .as_deref()
            .and_then(parse_expiry)
            .map(|expiry| expiry.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        Self {
            credits: user.user.credits.to_string(),
            subscription_expiry,
            status: user.user.status,
        }
    }

    pub fn to_request(&self, user_id: &str) -> Result<UpdateSubscriptionRequest, FormError> {
        let credits = match self.credits.trim() {
            "" => None,
            raw => Some(
                raw.parse::<i64>()
                    .map_err(|_| FormError::InvalidCredits(raw.to_string()))?,
            ),
        };

        let subscription_expiry = match self.subscription_expiry.trim() {
            "" => None,
            raw => {
                chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| FormError::InvalidExpiry(raw.to_string()))?;
                Some(raw.to_string())
            }
        };

        Ok(UpdateSubscriptionRequest {
            user_id: user_id.to_string(),
            credits,
            subscription_expiry,
            status: Some(self.status),
        })
    }
}

/// State behind the admin page.
#[derive(Debug, Default)]
pub struct AdminPanel {
    users: Vec<AdminUser>,
    query: String,
    selected: Option<AdminUser>,
}

impl AdminPanel {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn with_users(users: Vec<AdminUser>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    /// Fetch every user.
    pub fn load<A: Api + ?Sized>(&mut self, api: &A) -> Result<(), PanelError> {
        self.users = api
            .admin_users()
            .map_err(PanelError::failed("Failed to load users"))?;
        Ok(())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Users matching the current search.
    pub fn visible(&self) -> Vec<&AdminUser> {
        filter_users(&self.users, &self.query)
    }

    /// Message for an empty user list, if the list is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.visible().is_empty() {
            return None;
        }
        Some(if self.query.is_empty() {
            NO_USERS_MESSAGE
        } else {
            NO_MATCHING_USERS_MESSAGE
        })
    }

    pub fn users(&self) -> &[AdminUser] {
        &self.users
    }

    pub fn selected(&self) -> Option<&AdminUser> {
        self.selected.as_ref()
    }

    /// Load one user's full record and select it.
    pub fn select<A: Api + ?Sized>(
        &mut self,
        api: &A,
        user_id: &str,
    ) -> Result<&AdminUser, PanelError> {
        let user = api
            .admin_user(user_id)
            .map_err(PanelError::failed("Failed to load user details"))?;
        Ok(&*self.selected.insert(user))
    }

    /// Apply the form to the selected user.
    pub fn update<A: Api + ?Sized>(
        &mut self,
        api: &A,
        form: &SubscriptionForm,
    ) -> Result<&AdminUser, PanelError> {
        let Some(selected) = &self.selected else {
            return Err(FormError::NoUserSelected.into());
        };

        let request = form.to_request(&selected.user.id)?;
        let updated = api.update_subscription(&request)?;
        tracing::info!(user_id = %updated.user.id, "subscription updated");

        replace_user(&mut self.users, &updated);
        Ok(&*self.selected.insert(updated))
    }
}
