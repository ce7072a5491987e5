//! Boss model - a goal with hit points.

use crate::config::Difficulty;
use crate::id::{BossId, UserId};
use crate::Time;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A boss is a user-defined objective. Completing tasks linked to it deals
/// damage; at 0 HP it is defeated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    /// Unique identifier
    pub id: BossId,

    /// Boss title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Difficulty rating (determines starting HP and defeat XP)
    pub difficulty: Difficulty,

    /// Hit points at creation; never changes afterwards
    pub max_hp: u32,

    /// Remaining hit points, always within 0..=max_hp
    pub current_hp: u32,

    /// Set once, when current_hp first reaches 0
    pub defeated: bool,

    /// Optional parent boss (forest, kept acyclic by the services)
    pub parent_goal_id: Option<BossId>,

    /// Optional target date
    pub due_date: Option<NaiveDate>,

    /// Owning user
    pub owner_id: UserId,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

/// What a single application of damage did to a boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// HP after the hit (clamped at 0)
    pub new_hp: u32,

    /// True only on the hit that took the boss from alive to defeated
    pub newly_defeated: bool,
}

impl Boss {
    /// Create a boss at full HP.
    pub fn new(
        title: impl Into<String>,
        difficulty: Difficulty,
        max_hp: u32,
        owner_id: UserId,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: BossId::new(),
            title: title.into(),
            description: String::new(),
            difficulty,
            max_hp,
            current_hp: max_hp,
            defeated: false,
            parent_goal_id: None,
            due_date: None,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply damage, clamping HP at 0. The defeat flag is sticky: it flips
    /// exactly once, on the hit that reaches 0.
    pub fn apply_damage(&mut self, damage: u32) -> DamageOutcome {
        self.current_hp = self.current_hp.saturating_sub(damage);
        let newly_defeated = self.current_hp == 0 && !self.defeated;
        if newly_defeated {
            self.defeated = true;
        }
        DamageOutcome {
            new_hp: self.current_hp,
            newly_defeated,
        }
    }

    /// Display-only: a defeated boss stays editable.
    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss(hp: u32) -> Boss {
        Boss::new("Ship the release", Difficulty::Medium, hp, UserId::new())
    }

    #[test]
    fn damage_reduces_hp() {
        let mut b = boss(100);
        let outcome = b.apply_damage(10);
        assert_eq!(outcome.new_hp, 90);
        assert!(!outcome.newly_defeated);
        assert_eq!(b.current_hp, 90);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut b = boss(5);
        let outcome = b.apply_damage(20);
        assert_eq!(outcome.new_hp, 0);
        assert!(outcome.newly_defeated);
        assert!(b.defeated);
    }

    #[test]
    fn defeat_fires_only_once() {
        let mut b = boss(10);
        assert!(b.apply_damage(10).newly_defeated);
        // Further hits on a dead boss change nothing
        let again = b.apply_damage(10);
        assert_eq!(again.new_hp, 0);
        assert!(!again.newly_defeated);
    }

    #[test]
    fn exact_kill_reaches_zero() {
        let mut b = boss(20);
        let outcome = b.apply_damage(20);
        assert_eq!(outcome.new_hp, 0);
        assert!(outcome.newly_defeated);
    }
}
