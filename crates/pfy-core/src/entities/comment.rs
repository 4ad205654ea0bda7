use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A comment on a task. `parent_id = None` marks a top-level comment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub id: String,
    pub task_id: String,
    pub author_id: String,
    pub comment: String,
    pub is_edited: bool,
    pub parent_id: Option<String>,
    /// Ids of direct replies, newest first.
    pub replies: Vec<String>,
    pub last_edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
