//! User model - the owner of bosses and tasks.

use crate::id::UserId;
use crate::Time;
use serde::{Deserialize, Serialize};

/// XP needed to advance one level.
const XP_PER_LEVEL: u32 = 100;

/// A player. Identity comes from an external auth provider as an opaque
/// subject string; everything else is game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Opaque identity from the auth provider (unique per user)
    pub subject: String,

    /// Display name
    pub username: String,

    /// XP accumulated toward the next level
    pub experience: u32,

    /// Current level
    pub level: u32,

    /// Creation timestamp
    pub created_at: Time,
}

impl User {
    /// Create a user for a previously unseen auth subject.
    pub fn new(subject: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            subject: subject.into(),
            username: username.into(),
            experience: 0,
            level: 1,
            created_at: chrono::Utc::now(),
        }
    }

    /// Award XP, rolling overflow into levels at 100 XP apiece.
    pub fn add_experience(&mut self, amount: u32) {
        self.experience += amount;
        while self.experience >= XP_PER_LEVEL {
            self.experience -= XP_PER_LEVEL;
            self.level += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_accumulates_below_threshold() {
        let mut user = User::new("sub-1", "tester");
        user.add_experience(50);
        assert_eq!(user.experience, 50);
        assert_eq!(user.level, 1);
    }

    #[test]
    fn xp_rolls_over_into_level() {
        let mut user = User::new("sub-1", "tester");
        user.add_experience(120);
        assert_eq!(user.level, 2);
        assert_eq!(user.experience, 20);
    }

    #[test]
    fn large_award_carries_multiple_levels() {
        let mut user = User::new("sub-1", "tester");
        user.add_experience(250);
        assert_eq!(user.level, 3);
        assert_eq!(user.experience, 50);
    }
}
