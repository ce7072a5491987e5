//! Task model - the unit of work that damages bosses.

use crate::config::Difficulty;
use crate::id::{BossId, TaskId, UserId};
use crate::Time;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A task. Completing it deals difficulty-mapped damage to its linked boss
/// (if any). A task with `recurrence_days > 0` reopens that many days after
/// completion; one-shot tasks stay completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Difficulty rating (determines damage dealt)
    pub difficulty: Difficulty,

    /// Whether the task is currently completed
    pub completed: bool,

    /// Date of the most recent completion; cleared when the scanner reopens
    pub last_completed: Option<NaiveDate>,

    /// 0 = one-shot; N > 0 = reopens every N days
    pub recurrence_days: u32,

    /// Transient flag set by the recurrence scanner when a task reopens
    pub is_due: bool,

    /// Optional parent task (forest, kept acyclic by the services)
    pub parent_task_id: Option<TaskId>,

    /// Boss this task damages; unassigned tasks damage nothing
    pub goal_id: Option<BossId>,

    /// Owning user
    pub owner_id: UserId,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

impl Task {
    /// Create a pending task.
    pub fn new(title: impl Into<String>, difficulty: Difficulty, owner_id: UserId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: String::new(),
            difficulty,
            completed: false,
            last_completed: None,
            recurrence_days: 0,
            is_due: false,
            parent_task_id: None,
            goal_id: None,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the task reopens on a schedule.
    pub fn is_recurring(&self) -> bool {
        self.recurrence_days > 0
    }

    /// Date the task is due to reopen, for completed recurring tasks.
    pub fn next_due(&self) -> Option<NaiveDate> {
        if !self.is_recurring() {
            return None;
        }
        self.last_completed
            .and_then(|d| d.checked_add_days(Days::new(self.recurrence_days as u64)))
    }

    /// Whether the scanner should reopen this task today. A completed
    /// recurring task with no completion date counts as due immediately.
    pub fn due_for_reopen(&self, today: NaiveDate) -> bool {
        if !self.is_recurring() || !self.completed {
            return false;
        }
        match self.next_due() {
            Some(next) => next <= today,
            None => true,
        }
    }

    /// Mark completed as of `today`, clearing the due flag.
    pub fn mark_completed(&mut self, today: NaiveDate) {
        self.completed = true;
        self.last_completed = Some(today);
        self.is_due = false;
        self.updated_at = chrono::Utc::now();
    }

    /// Reopen a recurring task: back to pending, flagged due.
    pub fn reopen(&mut self) {
        self.completed = false;
        self.last_completed = None;
        self.is_due = true;
        self.updated_at = chrono::Utc::now();
    }
}

/// Filter for querying tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Restrict to one owner
    pub owner: Option<UserId>,

    /// Restrict by completion state
    pub completed: Option<bool>,

    /// Restrict to recurring (true) or one-shot (false) tasks
    pub recurring: Option<bool>,
}

impl TaskFilter {
    /// All tasks belonging to one user.
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    /// Whether a task passes the filter.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(owner) = self.owner {
            if task.owner_id != owner {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        if let Some(recurring) = self.recurring {
            if task.is_recurring() != recurring {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn recurring_task(days: u32) -> Task {
        let mut t = Task::new("Daily review", Difficulty::Easy, UserId::new());
        t.recurrence_days = days;
        t
    }

    #[test]
    fn one_shot_never_due_for_reopen() {
        let mut t = Task::new("One-off", Difficulty::Easy, UserId::new());
        t.mark_completed(date("2024-01-01"));
        assert!(!t.due_for_reopen(date("2024-06-01")));
    }

    #[test]
    fn recurring_due_exactly_n_days_later() {
        let mut t = recurring_task(7);
        t.mark_completed(date("2024-01-01"));
        // 01-01 + 7 = 01-08: the 7th is still too early
        assert!(!t.due_for_reopen(date("2024-01-07")));
        assert!(t.due_for_reopen(date("2024-01-08")));
        assert!(t.due_for_reopen(date("2024-01-09")));
    }

    #[test]
    fn pending_recurring_not_due() {
        let t = recurring_task(3);
        assert!(!t.due_for_reopen(date("2024-01-08")));
    }

    #[test]
    fn completed_recurring_without_date_is_due() {
        let mut t = recurring_task(3);
        t.completed = true;
        t.last_completed = None;
        assert!(t.due_for_reopen(date("2024-01-01")));
    }

    #[test]
    fn reopen_resets_state() {
        let mut t = recurring_task(3);
        t.mark_completed(date("2024-01-01"));
        t.reopen();
        assert!(!t.completed);
        assert!(t.last_completed.is_none());
        assert!(t.is_due);
    }

    #[test]
    fn mark_completed_clears_due_flag() {
        let mut t = recurring_task(3);
        t.is_due = true;
        t.mark_completed(date("2024-01-05"));
        assert!(t.completed);
        assert!(!t.is_due);
        assert_eq!(t.last_completed, Some(date("2024-01-05")));
    }

    #[test]
    fn filter_matches_owner_and_state() {
        let owner = UserId::new();
        let mut t = Task::new("Write docs", Difficulty::Medium, owner);
        t.completed = true;

        assert!(TaskFilter::owned_by(owner).matches(&t));
        assert!(!TaskFilter::owned_by(UserId::new()).matches(&t));

        let filter = TaskFilter {
            completed: Some(false),
            ..Default::default()
        };
        assert!(!filter.matches(&t));

        let filter = TaskFilter {
            recurring: Some(false),
            ..Default::default()
        };
        assert!(filter.matches(&t));
    }
}
