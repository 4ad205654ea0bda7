//! Recipient resolution for task notifications.
//!
//! The database layer resolves a task's assignee once, at the service
//! boundary, into a [`ResolvedAssignee`]. Everything downstream (dispatcher,
//! sweeper) only ever sees this tagged variant and never branches on whether
//! a reference was populated.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A task's assignee with group membership already loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedAssignee {
    #[default]
    Unassigned,
    User { id: String },
    Group { id: String, members: Vec<String> },
}

/// Everything the notification core needs to know about a task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecipients {
    pub task_id: String,
    pub title: String,
    pub creator_id: String,
    pub assignee: ResolvedAssignee,
}

impl TaskRecipients {
    /// Sender recorded on every notification for this task.
    #[must_use]
    pub fn sender_id(&self) -> &str {
        &self.creator_id
    }

    /// Deduplicated recipient ids: the creator, then the assignee user or
    /// every group member, in first-seen order.
    ///
    /// Blank ids are skipped. The result is empty only when the task has
    /// neither a creator nor anyone assigned.
    #[must_use]
    pub fn resolve(&self) -> Vec<String> {
        let candidates = std::iter::once(self.creator_id.as_str()).chain(
            match &self.assignee {
                ResolvedAssignee::Unassigned => Vec::new(),
                ResolvedAssignee::User { id } => vec![id.as_str()],
                ResolvedAssignee::Group { members, .. } => {
                    members.iter().map(String::as_str).collect()
                }
            },
        );

        let mut seen = HashSet::new();
        candidates
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter(|id| seen.insert(*id))
            .map(String::from)
            .collect()
    }
}
