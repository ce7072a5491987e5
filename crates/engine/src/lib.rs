//! The Questline engine.
//!
//! The task-completion and recurrence state machine: completing a task
//! deals difficulty-mapped damage to its linked boss, and the recurrence
//! scanner reopens completed recurring tasks when their day arrives.

#![warn(missing_docs)]

mod completion;
mod error;
mod notify;
mod recurrence;

pub use completion::{BossHit, CompletionEngine, CompletionOutcome};
pub use error::{EngineError, Result};
pub use notify::{NoopNotifier, Notifier, WebhookNotifier};
pub use recurrence::{RecurrenceScanner, ScanReport};
