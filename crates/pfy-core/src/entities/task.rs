use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AssigneeKind, TaskPriority, TaskStatus};

/// Who a task is assigned to, as stored (references only, never populated).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assignment {
    #[default]
    Unassigned,
    User { id: String },
    Group { id: String },
}

impl Assignment {
    #[must_use]
    pub const fn kind(&self) -> Option<AssigneeKind> {
        match self {
            Self::Unassigned => None,
            Self::User { .. } => Some(AssigneeKind::User),
            Self::Group { .. } => Some(AssigneeKind::Group),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Unassigned => None,
            Self::User { id } | Self::Group { id } => Some(id),
        }
    }

    /// Rebuild from the two storage columns. A missing half means unassigned.
    #[must_use]
    pub fn from_parts(kind: Option<AssigneeKind>, id: Option<String>) -> Self {
        match (kind, id) {
            (Some(AssigneeKind::User), Some(id)) => Self::User { id },
            (Some(AssigneeKind::Group), Some(id)) => Self::Group { id },
            _ => Self::Unassigned,
        }
    }
}

/// A single file attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub file_url: String,
    pub mime_type: String,
    pub size: Option<i64>,
}

/// A unit of work owned by exactly one creator, assigned to at most one
/// user or group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub creator_id: String,
    pub assignee: Assignment,
    pub category_id: Option<String>,
    pub attachment: Option<Attachment>,
    /// Flips to `true` once the due-soon reminder has been sent.
    pub due_date_notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
