//! Boss CRUD service.

use crate::forest::would_create_cycle;
use chrono::NaiveDate;
use questline_core::{Boss, BossId, Difficulty, GameConfig, Session};
use questline_engine::{EngineError, Result};
use questline_storage::Store;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Specification for creating a boss.
#[derive(Debug, Clone)]
pub struct CreateBoss {
    /// Boss title (required)
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Explicit max HP; when absent (or 0) the config's HP table applies
    pub max_hp: Option<u32>,
    /// Optional parent boss
    pub parent_goal_id: Option<BossId>,
    /// Optional target date
    pub due_date: Option<NaiveDate>,
}

/// Specification for updating a boss. Difficulty and HP are fixed at
/// creation and cannot be changed here.
#[derive(Debug, Clone)]
pub struct UpdateBoss {
    /// Boss title (required)
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Optional parent boss
    pub parent_goal_id: Option<BossId>,
    /// Optional target date
    pub due_date: Option<NaiveDate>,
}

/// Ownership-scoped CRUD over bosses.
pub struct BossService<S: Store> {
    store: Arc<Mutex<S>>,
    config: Arc<GameConfig>,
}

impl<S: Store> BossService<S> {
    /// Create a service over a shared store.
    pub fn new(store: Arc<Mutex<S>>, config: Arc<GameConfig>) -> Self {
        Self { store, config }
    }

    /// Create a boss at full HP for the session user.
    pub async fn create(&self, session: &Session, spec: CreateBoss) -> Result<Boss> {
        if spec.title.trim().is_empty() {
            return Err(EngineError::InvalidArgument("title is required".into()));
        }

        let mut store = self.store.lock().await;

        if let Some(parent_id) = spec.parent_goal_id {
            let parent = store
                .load_boss(parent_id)
                .await?
                .filter(|p| p.owner_id == session.user_id);
            if parent.is_none() {
                return Err(EngineError::InvalidArgument(format!(
                    "invalid parent goal id: {parent_id}"
                )));
            }
        }

        let max_hp = spec
            .max_hp
            .filter(|&hp| hp > 0)
            .unwrap_or_else(|| self.config.boss_max_hp(spec.difficulty));

        let mut boss = Boss::new(spec.title, spec.difficulty, max_hp, session.user_id);
        boss.description = spec.description;
        boss.parent_goal_id = spec.parent_goal_id;
        boss.due_date = spec.due_date;

        store.save_boss(&boss).await?;
        info!(boss = %boss.id, max_hp, "boss created");
        Ok(boss)
    }

    /// Load a boss, enforcing ownership.
    pub async fn get(&self, session: &Session, id: BossId) -> Result<Boss> {
        let store = self.store.lock().await;
        let boss = store
            .load_boss(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("boss {id}")))?;
        if boss.owner_id != session.user_id {
            return Err(EngineError::PermissionDenied(format!(
                "boss {id} belongs to another user"
            )));
        }
        Ok(boss)
    }

    /// All bosses owned by the session user.
    pub async fn list(&self, session: &Session) -> Result<Vec<Boss>> {
        Ok(self.store.lock().await.list_bosses(session.user_id).await?)
    }

    /// Update title, description, parent and due date. Defeated bosses
    /// stay editable; "defeated" is a display state only.
    pub async fn update(&self, session: &Session, id: BossId, spec: UpdateBoss) -> Result<Boss> {
        if spec.title.trim().is_empty() {
            return Err(EngineError::InvalidArgument("title is required".into()));
        }

        let mut store = self.store.lock().await;
        let mut boss = store
            .load_boss(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("boss {id}")))?;
        if boss.owner_id != session.user_id {
            return Err(EngineError::PermissionDenied(format!(
                "boss {id} belongs to another user"
            )));
        }

        if let Some(parent_id) = spec.parent_goal_id {
            let parent = store
                .load_boss(parent_id)
                .await?
                .filter(|p| p.owner_id == session.user_id);
            if parent.is_none() {
                return Err(EngineError::InvalidArgument(format!(
                    "invalid parent goal id: {parent_id}"
                )));
            }

            let parent_of: HashMap<BossId, BossId> = store
                .list_bosses(session.user_id)
                .await?
                .into_iter()
                .filter_map(|b| b.parent_goal_id.map(|p| (b.id, p)))
                .collect();
            if would_create_cycle(id, parent_id, &parent_of) {
                return Err(EngineError::InvalidArgument(format!(
                    "parent goal {parent_id} would make boss {id} its own ancestor"
                )));
            }
        }

        boss.title = spec.title;
        boss.description = spec.description;
        boss.parent_goal_id = spec.parent_goal_id;
        boss.due_date = spec.due_date;
        boss.updated_at = chrono::Utc::now();

        store.save_boss(&boss).await?;
        Ok(boss)
    }

    /// Delete a boss. Children keep their (now dangling) parent reference
    /// and read as roots; tasks that pointed at the boss surface NotFound
    /// on completion, which the engine reports without side effects.
    pub async fn delete(&self, session: &Session, id: BossId) -> Result<()> {
        let mut store = self.store.lock().await;
        let boss = store
            .load_boss(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("boss {id}")))?;
        if boss.owner_id != session.user_id {
            return Err(EngineError::PermissionDenied(format!(
                "boss {id} belongs to another user"
            )));
        }
        store.delete_boss(id).await?;
        info!(boss = %id, "boss deleted");
        Ok(())
    }
}
