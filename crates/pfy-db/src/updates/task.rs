//! Task update builder.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pfy_core::entities::{Assignment, Attachment};
use pfy_core::enums::{TaskPriority, TaskStatus};

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// A new due date also clears the due-soon marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Assignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Option<Attachment>>,
}

impl TaskUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.assignee.is_none()
            && self.category_id.is_none()
            && self.attachment.is_none()
    }
}

pub struct TaskUpdateBuilder(TaskUpdate);

impl TaskUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(TaskUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: TaskStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: TaskPriority) -> Self {
        self.0.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.0.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn assignee(mut self, assignee: Assignment) -> Self {
        self.0.assignee = Some(assignee);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Option<String>) -> Self {
        self.0.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.0.attachment = Some(attachment);
        self
    }

    #[must_use]
    pub fn build(self) -> TaskUpdate {
        self.0
    }
}

impl Default for TaskUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
