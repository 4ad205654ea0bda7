//! Response types returned as JSON by the HTTP surface.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Notification, Task};
use crate::views::CommentThread;

/// Pagination metadata. `total` counts every match, independent of the page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

/// Response for "my notifications": newest first plus the unread count.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInbox {
    pub data: Vec<Notification>,
    pub unread_count: u64,
}

/// A single task with its comment threads.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    pub task: Task,
    pub comments: Vec<CommentThread>,
}
