//! Questline core data models.
//!
//! This crate defines the data structures for the boss-battle task
//! tracker: bosses with hit points, tasks that damage them, and the
//! difficulty tables tying the two together.

#![warn(missing_docs)]

// Core identities
mod id;

// Entities
mod boss;
mod task;
mod user;

// Configuration and request context
mod config;
mod session;

// Re-exports
pub use id::*;

pub use boss::{Boss, DamageOutcome};
pub use config::{ConfigError, Difficulty, GameConfig};
pub use session::Session;
pub use task::{Task, TaskFilter};
pub use user::User;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
