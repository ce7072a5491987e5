//! Task CRUD service.
//!
//! Completion itself lives in the engine; this service covers creation,
//! editing, listing and cascade deletion.

use crate::forest::{would_create_cycle, ChildIndex};
use questline_core::{BossId, Difficulty, Session, Task, TaskFilter, TaskId};
use questline_engine::{EngineError, Result};
use questline_storage::Store;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Specification for creating a task.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Task title (required)
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// 0 = one-shot; N > 0 = reopens every N days
    pub recurrence_days: u32,
    /// Boss this task damages
    pub goal_id: Option<BossId>,
    /// Optional parent task
    pub parent_task_id: Option<TaskId>,
}

/// Specification for updating a task. Completion state is not editable
/// here; only the engine and the scanner move it.
#[derive(Debug, Clone)]
pub struct UpdateTask {
    /// Task title (required)
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// 0 = one-shot; N > 0 = reopens every N days
    pub recurrence_days: u32,
    /// Boss this task damages
    pub goal_id: Option<BossId>,
    /// Optional parent task
    pub parent_task_id: Option<TaskId>,
}

/// Ownership-scoped CRUD over tasks.
pub struct TaskService<S: Store> {
    store: Arc<Mutex<S>>,
}

impl<S: Store> TaskService<S> {
    /// Create a service over a shared store.
    pub fn new(store: Arc<Mutex<S>>) -> Self {
        Self { store }
    }

    /// Create a pending task for the session user.
    pub async fn create(&self, session: &Session, spec: CreateTask) -> Result<Task> {
        if spec.title.trim().is_empty() {
            return Err(EngineError::InvalidArgument("title is required".into()));
        }

        let mut store = self.store.lock().await;
        validate_references(&mut *store, session, spec.goal_id, spec.parent_task_id).await?;

        let mut task = Task::new(spec.title, spec.difficulty, session.user_id);
        task.description = spec.description;
        task.recurrence_days = spec.recurrence_days;
        task.goal_id = spec.goal_id;
        task.parent_task_id = spec.parent_task_id;

        store.save_task(&task).await?;
        info!(task = %task.id, "task created");
        Ok(task)
    }

    /// Load a task, enforcing ownership.
    pub async fn get(&self, session: &Session, id: TaskId) -> Result<Task> {
        let store = self.store.lock().await;
        let task = store
            .load_task(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("task {id}")))?;
        if task.owner_id != session.user_id {
            return Err(EngineError::PermissionDenied(format!(
                "task {id} belongs to another user"
            )));
        }
        Ok(task)
    }

    /// All tasks owned by the session user.
    pub async fn list(&self, session: &Session) -> Result<Vec<Task>> {
        let filter = TaskFilter::owned_by(session.user_id);
        Ok(self.store.lock().await.list_tasks(&filter).await?)
    }

    /// Update a task's editable fields.
    pub async fn update(&self, session: &Session, id: TaskId, spec: UpdateTask) -> Result<Task> {
        if spec.title.trim().is_empty() {
            return Err(EngineError::InvalidArgument("title is required".into()));
        }

        let mut store = self.store.lock().await;
        let mut task = store
            .load_task(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("task {id}")))?;
        if task.owner_id != session.user_id {
            return Err(EngineError::PermissionDenied(format!(
                "task {id} belongs to another user"
            )));
        }

        validate_references(&mut *store, session, spec.goal_id, spec.parent_task_id).await?;

        if let Some(parent_id) = spec.parent_task_id {
            let parent_of: HashMap<TaskId, TaskId> = store
                .list_tasks(&TaskFilter::owned_by(session.user_id))
                .await?
                .into_iter()
                .filter_map(|t| t.parent_task_id.map(|p| (t.id, p)))
                .collect();
            if would_create_cycle(id, parent_id, &parent_of) {
                return Err(EngineError::InvalidArgument(format!(
                    "parent task {parent_id} would make task {id} its own ancestor"
                )));
            }
        }

        task.title = spec.title;
        task.description = spec.description;
        task.difficulty = spec.difficulty;
        task.recurrence_days = spec.recurrence_days;
        task.goal_id = spec.goal_id;
        task.parent_task_id = spec.parent_task_id;
        task.updated_at = chrono::Utc::now();

        store.save_task(&task).await?;
        Ok(task)
    }

    /// Delete a task and every transitive descendant reachable through
    /// `parent_task_id`. Unrelated tasks are untouched.
    pub async fn delete(&self, session: &Session, id: TaskId) -> Result<()> {
        let mut store = self.store.lock().await;
        let task = store
            .load_task(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("task {id}")))?;
        if task.owner_id != session.user_id {
            return Err(EngineError::PermissionDenied(format!(
                "task {id} belongs to another user"
            )));
        }

        let all = store
            .list_tasks(&TaskFilter::owned_by(session.user_id))
            .await?;
        let index = ChildIndex::build(all.iter().map(|t| (t.id, t.parent_task_id)));

        let descendants = index.descendants(id);
        for child_id in &descendants {
            store.delete_task(*child_id).await?;
        }
        store.delete_task(id).await?;
        info!(task = %id, cascade = descendants.len(), "task deleted");
        Ok(())
    }
}

/// Check that a goal or parent-task reference exists and belongs to the
/// caller. Invalid references are rejected before any write.
async fn validate_references<S: Store>(
    store: &mut S,
    session: &Session,
    goal_id: Option<BossId>,
    parent_task_id: Option<TaskId>,
) -> Result<()> {
    if let Some(goal_id) = goal_id {
        let boss = store
            .load_boss(goal_id)
            .await?
            .filter(|b| b.owner_id == session.user_id);
        if boss.is_none() {
            return Err(EngineError::InvalidArgument(format!(
                "invalid goal id: {goal_id}"
            )));
        }
    }
    if let Some(parent_id) = parent_task_id {
        let parent = store
            .load_task(parent_id)
            .await?
            .filter(|t| t.owner_id == session.user_id);
        if parent.is_none() {
            return Err(EngineError::InvalidArgument(format!(
                "invalid parent task id: {parent_id}"
            )));
        }
    }
    Ok(())
}
