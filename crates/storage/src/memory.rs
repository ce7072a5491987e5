//! In-memory storage implementation.
//!
//! Backs tests and demos; state lives only as long as the process.

use super::{Result, Store};
use questline_core::{Boss, BossId, Task, TaskFilter, TaskId, User, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// HashMap-backed storage backend.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    bosses: RwLock<HashMap<BossId, Boss>>,
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn save_user(&mut self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_subject(&self, subject: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.subject == subject)
            .cloned())
    }

    async fn save_boss(&mut self, boss: &Boss) -> Result<()> {
        self.bosses.write().await.insert(boss.id, boss.clone());
        Ok(())
    }

    async fn load_boss(&self, id: BossId) -> Result<Option<Boss>> {
        Ok(self.bosses.read().await.get(&id).cloned())
    }

    async fn list_bosses(&self, owner: UserId) -> Result<Vec<Boss>> {
        Ok(self
            .bosses
            .read()
            .await
            .values()
            .filter(|b| b.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn delete_boss(&mut self, id: BossId) -> Result<()> {
        self.bosses.write().await.remove(&id);
        Ok(())
    }

    async fn save_task(&mut self, task: &Task) -> Result<()> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(())
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.tasks.write().await.remove(&id);
        Ok(())
    }
}
