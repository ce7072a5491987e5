//! Due-task notifications.
//!
//! Best-effort: a failed delivery is logged and never rolls back the state
//! transition that triggered it.

use async_trait::async_trait;
use questline_core::Task;

/// Sink for "task is due again" events.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a due notification for a reopened task.
    async fn task_due(&self, task: &Task) -> anyhow::Result<()>;
}

/// Discards all notifications.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn task_due(&self, _task: &Task) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Posts a small JSON payload to a webhook URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn task_due(&self, task: &Task) -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "event": "task_due",
            "task_id": task.id.to_string(),
            "title": task.title,
            "owner_id": task.owner_id.to_string(),
        });
        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
