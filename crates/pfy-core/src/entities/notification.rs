use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Notification type written when a task is updated.
pub const TASK_UPDATED: &str = "task_updated";

/// Notification type written by the due-date sweep.
pub const TASK_DUE_SOON: &str = "task_due_soon";

/// One persisted notification per (event, recipient) pair.
///
/// This is also the payload pushed over the live channel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    /// Free-form tag, e.g. [`TASK_UPDATED`] or [`TASK_DUE_SOON`].
    pub notification_type: String,
    pub is_read: bool,
    pub task_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
