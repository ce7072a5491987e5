//! Request context.
//!
//! The original system threaded the current user through shared mutable
//! state; here the caller's identity is an explicit value passed into every
//! engine and service call.

use crate::id::UserId;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The acting user
    pub user_id: UserId,
}

impl Session {
    /// Build a session for an authenticated user.
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
