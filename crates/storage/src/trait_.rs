//! Storage trait abstraction.

use async_trait::async_trait;
use questline_core::{Boss, BossId, Task, TaskFilter, TaskId, User, UserId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Storage abstraction for Questline data.
///
/// This trait allows different storage backends to be plugged in. Stores do
/// no authorization: records are keyed and queryable by owner, but callers
/// (engine, services) check ownership themselves.
#[async_trait]
pub trait Store: Send + Sync {
    // === User operations ===

    /// Save a user (create or update).
    async fn save_user(&mut self, user: &User) -> Result<()>;

    /// Load a user by ID.
    async fn load_user(&self, id: UserId) -> Result<Option<User>>;

    /// Find a user by their external auth subject.
    async fn find_user_by_subject(&self, subject: &str) -> Result<Option<User>>;

    // === Boss operations ===

    /// Save a boss (create or update).
    async fn save_boss(&mut self, boss: &Boss) -> Result<()>;

    /// Load a boss by ID.
    async fn load_boss(&self, id: BossId) -> Result<Option<Boss>>;

    /// List all bosses owned by a user.
    async fn list_bosses(&self, owner: UserId) -> Result<Vec<Boss>>;

    /// Delete a boss.
    async fn delete_boss(&mut self, id: BossId) -> Result<()>;

    // === Task operations ===

    /// Save a task (create or update).
    async fn save_task(&mut self, task: &Task) -> Result<()>;

    /// Load a task by ID.
    async fn load_task(&self, id: TaskId) -> Result<Option<Task>>;

    /// List tasks matching the filter.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Delete a task.
    async fn delete_task(&mut self, id: TaskId) -> Result<()>;
}
