//! JSON file storage implementation.
//!
//! One JSON document per entity under `users/`, `bosses/` and `tasks/`
//! subdirectories of the root. Writes go through a temp file and rename, so
//! an interrupted write never leaves a truncated document behind.

use super::{Result, StorageError, Store};
use questline_core::{Boss, BossId, Task, TaskFilter, TaskId, User, UserId};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// File-based JSON storage backend.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Create storage rooted at `root`, creating the per-collection
    /// subdirectories as needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("users")).await?;
        fs::create_dir_all(root.join("bosses")).await?;
        fs::create_dir_all(root.join("tasks")).await?;

        Ok(Self { root })
    }

    fn user_path(&self, id: UserId) -> PathBuf {
        self.root.join("users").join(format!("{}.json", id))
    }

    fn boss_path(&self, id: BossId) -> PathBuf {
        self.root.join("bosses").join(format!("{}.json", id))
    }

    fn task_path(&self, id: TaskId) -> PathBuf {
        self.root.join("tasks").join(format!("{}.json", id))
    }
}

#[async_trait::async_trait]
impl Store for JsonStore {
    async fn save_user(&mut self, user: &User) -> Result<()> {
        write_json(&self.user_path(user.id), user).await
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>> {
        read_json(&self.user_path(id)).await
    }

    async fn find_user_by_subject(&self, subject: &str) -> Result<Option<User>> {
        let users: Vec<User> = list_dir(&self.root.join("users")).await?;
        Ok(users.into_iter().find(|u| u.subject == subject))
    }

    async fn save_boss(&mut self, boss: &Boss) -> Result<()> {
        write_json(&self.boss_path(boss.id), boss).await
    }

    async fn load_boss(&self, id: BossId) -> Result<Option<Boss>> {
        read_json(&self.boss_path(id)).await
    }

    async fn list_bosses(&self, owner: UserId) -> Result<Vec<Boss>> {
        let all: Vec<Boss> = list_dir(&self.root.join("bosses")).await?;
        Ok(all.into_iter().filter(|b| b.owner_id == owner).collect())
    }

    async fn delete_boss(&mut self, id: BossId) -> Result<()> {
        remove_file(&self.boss_path(id)).await
    }

    async fn save_task(&mut self, task: &Task) -> Result<()> {
        write_json(&self.task_path(task.id), task).await
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<Task>> {
        read_json(&self.task_path(id)).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let all: Vec<Task> = list_dir(&self.root.join("tasks")).await?;
        Ok(all.into_iter().filter(|t| filter.matches(t)).collect())
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        remove_file(&self.task_path(id)).await
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json.as_bytes()).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).await.or_else(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Ok(())
        } else {
            Err(StorageError::Io(e))
        }
    })
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping unreadable document");
            }
        }
    }
    Ok(items)
}
