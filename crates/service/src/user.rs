//! User service.
//!
//! Identity arrives from an external auth provider as an opaque subject;
//! the first request for an unseen subject provisions a user record.

use questline_core::{Session, User};
use questline_engine::{EngineError, Result};
use questline_storage::Store;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// User lookup and provisioning.
pub struct UserService<S: Store> {
    store: Arc<Mutex<S>>,
}

impl<S: Store> UserService<S> {
    /// Create a service over a shared store.
    pub fn new(store: Arc<Mutex<S>>) -> Self {
        Self { store }
    }

    /// Resolve an auth subject to its user, creating the record on first
    /// sight with a placeholder username derived from the subject.
    pub async fn get_or_create(&self, subject: &str) -> Result<User> {
        if subject.trim().is_empty() {
            return Err(EngineError::Unauthenticated);
        }

        let mut store = self.store.lock().await;
        if let Some(user) = store.find_user_by_subject(subject).await? {
            return Ok(user);
        }

        let prefix: String = subject.chars().take(8).collect();
        let user = User::new(subject, format!("User_{prefix}"));
        store.save_user(&user).await?;
        info!(user = %user.id, "user provisioned");
        Ok(user)
    }

    /// Load the session's user record.
    pub async fn get(&self, session: &Session) -> Result<User> {
        self.store
            .lock()
            .await
            .load_user(session.user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {}", session.user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_storage::MemoryStore;

    fn service() -> UserService<MemoryStore> {
        UserService::new(Arc::new(Mutex::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn first_sight_provisions_user() {
        let service = service();
        let user = service.get_or_create("auth0|1234567890").await.unwrap();
        assert_eq!(user.username, "User_auth0|12");
        assert_eq!(user.level, 1);
    }

    #[tokio::test]
    async fn same_subject_resolves_same_user() {
        let service = service();
        let first = service.get_or_create("sub-a").await.unwrap();
        let second = service.get_or_create("sub-a").await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn empty_subject_is_unauthenticated() {
        let service = service();
        let err = service.get_or_create("  ").await.unwrap_err();
        assert!(matches!(err, EngineError::Unauthenticated));
    }
}
