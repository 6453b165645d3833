//! Usage and subscription summary.

use chrono::{DateTime, NaiveDate, Utc};

use crate::api::User;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Credit usage and subscription figures for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub total_credits: i64,
    pub used_credits: i64,
    pub remaining_credits: i64,
    /// 0 to 100; 0 when no credits were ever granted.
    pub usage_percent: f64,
    pub subscription_expiry: Option<DateTime<Utc>>,
    /// Whole days left, rounded up. Not positive once expired.
    pub days_until_expiry: Option<i64>,
    pub is_guest: bool,
}

impl UsageSummary {
    pub fn from_user(user: Option<&User>, now: DateTime<Utc>) -> Self {
        let total_credits = user.map_or(0, |u| u.credits);
        let used_credits = user.map_or(0, |u| u.used_credits);
        let usage_percent = if total_credits > 0 {
            used_credits as f64 / total_credits as f64 * 100.0
        } else {
            0.0
        };

        let subscription_expiry = user
            .and_then(|u| u.subscription_expiry.as_deref())
            .and_then(parse_expiry);
        let days_until_expiry = subscription_expiry.map(|expiry| {
            let millis = (expiry - now).num_milliseconds();
            // Ceiling division that also holds for negative spans.
            -((-millis).div_euclid(MILLIS_PER_DAY))
        });

        Self {
            total_credits,
            used_credits,
            remaining_credits: user.map_or(0, User::remaining_credits),
            usage_percent,
            subscription_expiry,
            days_until_expiry,
            is_guest: user.is_some_and(|u| u.id == "guest"),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.days_until_expiry.is_some_and(|days| days <= 0)
    }

    /// Short label for the subscription card.
    pub fn subscription_label(&self) -> String {
        match self.days_until_expiry {
            None => "No subscription".to_string(),
            Some(days) if days > 0 => format!("{days} days"),
            Some(_) => "Expired".to_string(),
        }
    }
}

/// Parse an expiry that is either RFC 3339 or a bare `YYYY-MM-DD` date.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
