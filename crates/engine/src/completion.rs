//! The completion engine.
//!
//! Resolves "complete task X for user U" into a consistent (task, boss)
//! state pair: validates ownership, deals difficulty-mapped damage to the
//! linked boss, flips the task to completed, and awards defeat XP.

use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use questline_core::{Boss, BossId, GameConfig, Session, Task, TaskId};
use questline_storage::Store;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// The boss-side effect of one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossHit {
    /// The boss that took the hit
    pub boss_id: BossId,

    /// HP after the hit (clamped at 0)
    pub new_hp: u32,

    /// Whether this hit defeated the boss
    pub defeated: bool,
}

/// Result of a successful completion, returned so the caller can refresh
/// its view without a second round trip.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// The task in its post-completion state
    pub task: Task,

    /// Present when the task was linked to a boss
    pub boss: Option<BossHit>,
}

/// The completion engine.
///
/// Shares one mutex-guarded store with the recurrence scanner and the
/// services; `complete_task` holds the guard across its whole
/// read-check-write span, so concurrent completions of the same task
/// serialize and the loser hits the already-completed rejection instead of
/// double-applying damage.
pub struct CompletionEngine<S: Store> {
    store: Arc<Mutex<S>>,
    config: Arc<GameConfig>,
}

impl<S: Store> CompletionEngine<S> {
    /// Create an engine over a shared store.
    pub fn new(store: Arc<Mutex<S>>, config: Arc<GameConfig>) -> Self {
        Self { store, config }
    }

    /// Complete a task as of the server's current date.
    pub async fn complete_task(
        &self,
        session: &Session,
        task_id: TaskId,
    ) -> Result<CompletionOutcome> {
        self.complete_task_at(session, task_id, chrono::Utc::now().date_naive())
            .await
    }

    /// Complete a task as of an explicit date. All preconditions are
    /// checked before the first write; a rejected call writes nothing.
    pub async fn complete_task_at(
        &self,
        session: &Session,
        task_id: TaskId,
        today: NaiveDate,
    ) -> Result<CompletionOutcome> {
        let mut store = self.store.lock().await;

        let mut task = store
            .load_task(task_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("task {task_id}")))?;

        if task.owner_id != session.user_id {
            return Err(EngineError::PermissionDenied(format!(
                "task {task_id} belongs to another user"
            )));
        }

        if task.completed {
            // Uniform for one-shot and recurring tasks: only the scanner
            // flips a completed task back to pending.
            return Err(EngineError::FailedPrecondition(
                "task is already completed".to_string(),
            ));
        }

        // Resolve and validate the linked boss before touching anything.
        let boss_before: Option<Boss> = match task.goal_id {
            Some(goal_id) => {
                let boss = store
                    .load_boss(goal_id)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("boss {goal_id}")))?;
                if boss.owner_id != session.user_id {
                    return Err(EngineError::PermissionDenied(format!(
                        "boss {goal_id} belongs to another user"
                    )));
                }
                Some(boss)
            }
            None => None,
        };

        let mut boss_hit = None;
        if let Some(prior) = &boss_before {
            let damage = self.config.damage(task.difficulty);
            let mut boss = prior.clone();
            let outcome = boss.apply_damage(damage);
            boss.updated_at = chrono::Utc::now();
            store.save_boss(&boss).await?;

            debug!(
                boss = %boss.id,
                damage,
                new_hp = outcome.new_hp,
                "applied task damage"
            );

            boss_hit = Some(BossHit {
                boss_id: boss.id,
                new_hp: outcome.new_hp,
                defeated: outcome.newly_defeated,
            });
        }

        task.mark_completed(today);
        if let Err(e) = store.save_task(&task).await {
            // Restore the boss so the pair lands together or not at all.
            if let Some(prior) = &boss_before {
                if let Err(undo) = store.save_boss(prior).await {
                    warn!(boss = %prior.id, error = %undo, "failed to undo boss HP write");
                }
            }
            return Err(e.into());
        }

        // Defeat XP is bonus state: a failed award logs and does not fail
        // the completion.
        if let (Some(hit), Some(prior)) = (&boss_hit, &boss_before) {
            if hit.defeated {
                let reward = self.config.xp_reward(prior.difficulty);
                match store.load_user(prior.owner_id).await {
                    Ok(Some(mut user)) => {
                        user.add_experience(reward);
                        if let Err(e) = store.save_user(&user).await {
                            warn!(user = %prior.owner_id, error = %e, "failed to award defeat XP");
                        } else {
                            info!(user = %user.id, reward, level = user.level, "boss defeated, XP awarded");
                        }
                    }
                    Ok(None) => {
                        warn!(user = %prior.owner_id, "boss owner has no user record, skipping XP");
                    }
                    Err(e) => {
                        warn!(user = %prior.owner_id, error = %e, "failed to load user for XP award");
                    }
                }
            }
        }

        info!(task = %task.id, "task completed");
        Ok(CompletionOutcome {
            task,
            boss: boss_hit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_core::{Difficulty, User, UserId};
    use questline_storage::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    struct Fixture {
        store: Arc<Mutex<MemoryStore>>,
        engine: CompletionEngine<MemoryStore>,
        session: Session,
        user: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let engine = CompletionEngine::new(store.clone(), Arc::new(GameConfig::default()));
        let user = User::new("sub-alice", "alice");
        store.lock().await.save_user(&user).await.unwrap();
        let session = Session::new(user.id);
        Fixture {
            store,
            engine,
            session,
            user,
        }
    }

    async fn seed_boss(f: &Fixture, hp: u32) -> Boss {
        let boss = Boss::new("Dragon", Difficulty::Hard, hp, f.user.id);
        f.store.lock().await.save_boss(&boss).await.unwrap();
        boss
    }

    async fn seed_task(f: &Fixture, difficulty: Difficulty, goal_id: Option<BossId>) -> Task {
        let mut task = Task::new("Slay", difficulty, f.user.id);
        task.goal_id = goal_id;
        f.store.lock().await.save_task(&task).await.unwrap();
        task
    }

    #[tokio::test]
    async fn completion_damages_linked_boss() {
        let f = fixture().await;
        let boss = seed_boss(&f, 100).await;
        let task = seed_task(&f, Difficulty::Medium, Some(boss.id)).await;

        let outcome = f
            .engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap();

        let hit = outcome.boss.unwrap();
        assert_eq!(hit.new_hp, 90);
        assert!(!hit.defeated);
        assert!(outcome.task.completed);
        assert_eq!(outcome.task.last_completed, Some(date("2024-03-01")));

        let stored = f.store.lock().await.load_boss(boss.id).await.unwrap().unwrap();
        assert_eq!(stored.current_hp, 90);
    }

    #[tokio::test]
    async fn second_completion_rejected_without_damage() {
        let f = fixture().await;
        let boss = seed_boss(&f, 100).await;
        let task = seed_task(&f, Difficulty::Medium, Some(boss.id)).await;

        f.engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap();
        let err = f
            .engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::FailedPrecondition(_)));
        let stored = f.store.lock().await.load_boss(boss.id).await.unwrap().unwrap();
        assert_eq!(stored.current_hp, 90);
    }

    #[tokio::test]
    async fn overkill_clamps_hp_at_zero() {
        let f = fixture().await;
        let boss = seed_boss(&f, 5).await;
        let task = seed_task(&f, Difficulty::Hard, Some(boss.id)).await;

        let outcome = f
            .engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap();

        let hit = outcome.boss.unwrap();
        assert_eq!(hit.new_hp, 0);
        assert!(hit.defeated);

        let stored = f.store.lock().await.load_boss(boss.id).await.unwrap().unwrap();
        assert_eq!(stored.current_hp, 0);
        assert!(stored.defeated);
    }

    #[tokio::test]
    async fn defeat_awards_xp_with_level_rollover() {
        let f = fixture().await;
        // Hard boss: default XP reward 100 -> exactly one level
        let boss = seed_boss(&f, 10).await;
        let task = seed_task(&f, Difficulty::Hard, Some(boss.id)).await;

        f.engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap();

        let user = f.store.lock().await.load_user(f.user.id).await.unwrap().unwrap();
        assert_eq!(user.level, 2);
        assert_eq!(user.experience, 0);
    }

    #[tokio::test]
    async fn defeated_boss_awards_no_further_xp() {
        let f = fixture().await;
        let boss = seed_boss(&f, 10).await;
        let first = seed_task(&f, Difficulty::Hard, Some(boss.id)).await;
        let second = seed_task(&f, Difficulty::Hard, Some(boss.id)).await;

        f.engine
            .complete_task_at(&f.session, first.id, date("2024-03-01"))
            .await
            .unwrap();
        let outcome = f
            .engine
            .complete_task_at(&f.session, second.id, date("2024-03-01"))
            .await
            .unwrap();

        // Boss already at 0: hit lands but defeat does not re-fire
        assert!(!outcome.boss.unwrap().defeated);
        let user = f.store.lock().await.load_user(f.user.id).await.unwrap().unwrap();
        assert_eq!(user.level, 2);
    }

    #[tokio::test]
    async fn unassigned_task_damages_nothing() {
        let f = fixture().await;
        let task = seed_task(&f, Difficulty::Epic, None).await;

        let outcome = f
            .engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap();

        assert!(outcome.boss.is_none());
        assert!(outcome.task.completed);
    }

    #[tokio::test]
    async fn recurring_completion_clears_due_flag() {
        let f = fixture().await;
        let mut task = Task::new("Daily standup", Difficulty::Easy, f.user.id);
        task.recurrence_days = 1;
        task.is_due = true;
        f.store.lock().await.save_task(&task).await.unwrap();

        let outcome = f
            .engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap();

        assert!(outcome.task.completed);
        assert!(!outcome.task.is_due);
        assert_eq!(outcome.task.last_completed, Some(date("2024-03-01")));
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let f = fixture().await;
        let err = f
            .engine
            .complete_task_at(&f.session, TaskId::new(), date("2024-03-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn foreign_task_is_permission_denied() {
        let f = fixture().await;
        let boss = seed_boss(&f, 100).await;
        let task = seed_task(&f, Difficulty::Medium, Some(boss.id)).await;

        let stranger = Session::new(UserId::new());
        let err = f
            .engine
            .complete_task_at(&stranger, task.id, date("2024-03-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::PermissionDenied(_)));
        // No mutation on rejection
        let stored_task = f.store.lock().await.load_task(task.id).await.unwrap().unwrap();
        assert!(!stored_task.completed);
        let stored_boss = f.store.lock().await.load_boss(boss.id).await.unwrap().unwrap();
        assert_eq!(stored_boss.current_hp, 100);
    }

    #[tokio::test]
    async fn dangling_goal_reference_is_not_found() {
        let f = fixture().await;
        let task = seed_task(&f, Difficulty::Medium, Some(BossId::new())).await;

        let err = f
            .engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::NotFound(_)));
        let stored = f.store.lock().await.load_task(task.id).await.unwrap().unwrap();
        assert!(!stored.completed);
    }

    #[tokio::test]
    async fn foreign_boss_is_permission_denied() {
        // Inconsistent data: caller's task pointing at someone else's boss.
        let f = fixture().await;
        let foreign_boss = Boss::new("Hydra", Difficulty::Easy, 50, UserId::new());
        f.store.lock().await.save_boss(&foreign_boss).await.unwrap();
        let task = seed_task(&f, Difficulty::Easy, Some(foreign_boss.id)).await;

        let err = f
            .engine
            .complete_task_at(&f.session, task.id, date("2024-03-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::PermissionDenied(_)));
        let stored = f
            .store
            .lock()
            .await
            .load_boss(foreign_boss.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_hp, 50);
    }

    #[tokio::test]
    async fn damage_defaults_to_zero_for_unmapped_difficulty() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        // A config whose damage table lacks Epic entirely
        let config = GameConfig {
            damage: [(Difficulty::Easy, 5)].into_iter().collect(),
            ..GameConfig::default()
        };
        let engine = CompletionEngine::new(store.clone(), Arc::new(config));
        let user = User::new("sub", "u");
        store.lock().await.save_user(&user).await.unwrap();
        let session = Session::new(user.id);

        let boss = Boss::new("Golem", Difficulty::Epic, 100, user.id);
        store.lock().await.save_boss(&boss).await.unwrap();
        let mut task = Task::new("Epic feat", Difficulty::Epic, user.id);
        task.goal_id = Some(boss.id);
        store.lock().await.save_task(&task).await.unwrap();

        let outcome = engine
            .complete_task_at(&session, task.id, date("2024-03-01"))
            .await
            .unwrap();

        assert_eq!(outcome.boss.unwrap().new_hp, 100);
        assert!(outcome.task.completed);
    }
}
