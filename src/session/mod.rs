//! Client-side session persistence.
//!
//! The store holds an auth token and user profile, or a guest flag, in a
//! pluggable repository so tests can substitute an in-memory fake.

mod storage;
mod store;

pub use storage::{
    DetachedRepository, FileSessionRepository, MemorySessionRepository, SessionRepository,
};
pub use store::{GUEST_KEY, SessionStore, TOKEN_KEY, USER_KEY, synthetic_guest_profile};
