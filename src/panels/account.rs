//! Account panel.

use crate::api::User;

use super::usage::parse_expiry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub initial: char,
    pub email: String,
    pub plan: String,
    pub subscription: String,
}

impl AccountSummary {
    pub fn from_user(user: Option<&User>) -> Self {
        let email = user.map(|u| u.email.clone()).unwrap_or_default();
        let initial = email
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('U');

        let plan = user
            .and_then(|u| u.plan.clone())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "Free Plan".to_string());

        let subscription = user
            .and_then(|u| u.subscription_expiry.as_deref())
            .and_then(parse_expiry)
            .map(|expiry| expiry.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "No active subscription".to_string());

        Self {
            initial,
            email,
            plan,
            subscription,
        }
    }
}
