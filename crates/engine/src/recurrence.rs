//! The recurrence scanner.
//!
//! Converts elapsed time into reopened tasks: any completed recurring task
//! whose next-due date has arrived goes back to pending with the due flag
//! set. Runs once at startup and again at every local-midnight boundary.

use crate::error::Result;
use crate::notify::Notifier;
use chrono::NaiveDate;
use questline_core::{Task, TaskFilter, TaskId};
use questline_storage::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Fallback sleep when midnight arithmetic produces nothing sensible.
const RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of one scan pass.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Completed recurring tasks inspected
    pub scanned: usize,

    /// Tasks flipped back to pending this pass
    pub reopened: Vec<TaskId>,
}

/// The recurrence scanner. Shares the engine's store mutex, so a task can
/// never be reopened in the same instant it is being completed.
pub struct RecurrenceScanner<S: Store, N: Notifier> {
    store: Arc<Mutex<S>>,
    notifier: N,
}

impl<S: Store, N: Notifier> RecurrenceScanner<S, N> {
    /// Create a scanner over a shared store.
    pub fn new(store: Arc<Mutex<S>>, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Reopen every completed recurring task whose due date has arrived.
    ///
    /// Idempotent: a task reopened by an earlier pass is pending and falls
    /// outside the completed-recurring query.
    pub async fn scan_and_reopen(&self, today: NaiveDate) -> Result<ScanReport> {
        let mut reopened = Vec::new();
        let scanned;
        {
            let mut store = self.store.lock().await;
            let filter = TaskFilter {
                completed: Some(true),
                recurring: Some(true),
                ..Default::default()
            };
            let tasks = store.list_tasks(&filter).await?;
            scanned = tasks.len();

            for mut task in tasks {
                if !task.due_for_reopen(today) {
                    debug!(task = %task.id, "not yet due");
                    continue;
                }
                task.reopen();
                store.save_task(&task).await?;
                info!(task = %task.id, title = %task.title, "task reopened as due");
                reopened.push(task);
            }
        }

        // Notify outside the store lock; delivery failures never roll back
        // the reopen.
        for task in &reopened {
            if let Err(e) = self.notifier.task_due(task).await {
                warn!(task = %task.id, error = %e, "due notification failed");
            }
        }

        Ok(ScanReport {
            scanned,
            reopened: reopened.into_iter().map(|t| t.id).collect(),
        })
    }

    /// Scan now, then once after every local midnight, forever.
    pub async fn run_daily(&self) -> Result<()> {
        loop {
            let today = chrono::Local::now().date_naive();
            match self.scan_and_reopen(today).await {
                Ok(report) => {
                    info!(
                        scanned = report.scanned,
                        reopened = report.reopened.len(),
                        "recurrence scan complete"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "recurrence scan failed, will retry after next boundary");
                }
            }
            tokio::time::sleep(until_next_local_midnight()).await;
        }
    }
}

/// Duration from now until the next local midnight.
fn until_next_local_midnight() -> Duration {
    let now = chrono::Local::now().naive_local();
    let next_midnight = now
        .date()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    match next_midnight {
        Some(midnight) => (midnight - now).to_std().unwrap_or(RETRY_INTERVAL),
        None => RETRY_INTERVAL,
    }
}
