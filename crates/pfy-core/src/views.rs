//! Read-side views assembled by the task aggregation query.
//!
//! Summaries carry only public fields; nothing here can expose account
//! internals beyond name, email and avatar.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Attachment, TaskComment};
use crate::enums::{TaskPriority, TaskStatus};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub members: Vec<UserSummary>,
}

/// Populated assignee.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssigneeView {
    #[default]
    Unassigned,
    User(UserSummary),
    Group(GroupView),
}

/// One row of the task listing: the task plus its resolved references and
/// a comment count.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub due_date_notified: bool,
    pub attachment: Option<Attachment>,
    pub creator: Option<UserSummary>,
    pub category: Option<CategorySummary>,
    pub assignee: AssigneeView,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment with its author and direct replies populated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: TaskComment,
    pub author: Option<UserSummary>,
    pub reply_threads: Vec<CommentThread>,
}
