//! Page-level view models.
//!
//! Each panel fetches its own data, reports loading and empty states, and
//! derives what the page displays. Rendering is left to the caller.

pub mod account;
pub mod admin;
pub mod auth_forms;
pub mod dashboard;
mod errors;
pub mod guard;
pub mod library;
pub mod usage;

pub use account::AccountSummary;
pub use admin::{AdminPanel, SubscriptionForm, filter_users, replace_user};
pub use dashboard::{ProfileLoad, load_profile};
pub use errors::{FormError, PanelError};
pub use guard::{Access, check_access};
pub use usage::UsageSummary;
