//! Notification dispatcher.
//!
//! `notify` fans one event out to every recipient of a task in parallel.
//! Each recipient gets its own store write (bounded by a timeout) followed
//! by a push to its room. A failure for one recipient is logged and
//! reported, never propagated, and never affects the others.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pfy_core::entities::Notification;
use pfy_core::recipients::TaskRecipients;
use pfy_db::service::PfyService;

use crate::error::NotifyError;
use crate::push::PushChannel;
use crate::store::NotificationStore;

/// Outcome of one dispatch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Resolved, deduplicated recipient ids.
    pub recipients: Vec<String>,
    /// One persisted record per recipient that succeeded.
    pub delivered: Vec<Notification>,
    /// Live connections reached across all pushes.
    pub pushed: usize,
    /// Recipients whose record could not be written.
    pub failed: Vec<String>,
}

impl DispatchReport {
    #[must_use]
    pub fn persisted(&self) -> usize {
        self.delivered.len()
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<PfyService>,
    store: Arc<dyn NotificationStore>,
    channel: Arc<dyn PushChannel>,
    recipient_timeout: Duration,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        service: Arc<PfyService>,
        channel: Arc<dyn PushChannel>,
        recipient_timeout: Duration,
    ) -> Self {
        let store: Arc<dyn NotificationStore> = service.clone();
        Self {
            service,
            store,
            channel,
            recipient_timeout,
        }
    }

    /// Write records through `store` instead of the service.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn NotificationStore>) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub const fn service(&self) -> &Arc<PfyService> {
        &self.service
    }

    /// Record and push `message` to every recipient of `target`.
    ///
    /// The sender of every record is the task's creator. The push event
    /// name equals `notification_type`.
    pub async fn notify(
        &self,
        target: &TaskRecipients,
        message: &str,
        notification_type: &str,
    ) -> DispatchReport {
        let recipients = target.resolve();
        if recipients.is_empty() {
            tracing::warn!(task_id = %target.task_id, "task has no recipients");
            return DispatchReport::default();
        }

        let sender_id = target.sender_id();
        let outcomes = join_all(recipients.iter().map(|receiver_id| {
            self.deliver(sender_id, receiver_id, message, notification_type, &target.task_id)
        }))
        .await;

        let mut report = DispatchReport {
            recipients: recipients.clone(),
            ..DispatchReport::default()
        };
        for (receiver_id, outcome) in recipients.into_iter().zip(outcomes) {
            match outcome {
                Ok((notification, reached)) => {
                    report.pushed += reached;
                    report.delivered.push(notification);
                }
                Err(error) => {
                    tracing::warn!(
                        %error,
                        task_id = %target.task_id,
                        receiver_id = %receiver_id,
                        "notification not recorded"
                    );
                    report.failed.push(receiver_id);
                }
            }
        }

        tracing::debug!(
            task_id = %target.task_id,
            notification_type,
            persisted = report.persisted(),
            failed = report.failed.len(),
            pushed = report.pushed,
            "dispatch finished"
        );
        report
    }

    /// Load the task, resolve its assignee, and [`Self::notify`].
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Database` if the task cannot be loaded.
    pub async fn notify_task(
        &self,
        task_id: &str,
        message: &str,
        notification_type: &str,
    ) -> Result<DispatchReport, NotifyError> {
        let task = self.service.get_task(task_id).await?;
        let target = self.service.task_recipients(&task).await?;
        Ok(self.notify(&target, message, notification_type).await)
    }

    async fn deliver(
        &self,
        sender_id: &str,
        receiver_id: &str,
        message: &str,
        notification_type: &str,
        task_id: &str,
    ) -> Result<(Notification, usize), NotifyError> {
        let record = self
            .store
            .record(sender_id, receiver_id, message, notification_type, task_id);
        let notification = tokio::time::timeout(self.recipient_timeout, record)
            .await
            .map_err(|_| NotifyError::RecipientTimeout {
                receiver_id: receiver_id.to_string(),
                timeout: self.recipient_timeout,
            })??;

        let reached = match self
            .channel
            .emit(receiver_id, notification_type, &notification)
        {
            Ok(reached) => reached,
            Err(error) => {
                tracing::warn!(%error, receiver_id, "push failed");
                0
            }
        };
        Ok((notification, reached))
    }
}
