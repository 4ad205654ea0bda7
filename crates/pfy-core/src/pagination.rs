//! Pagination options shared by list endpoints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{SortOrder, TaskSortKey};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 50;

/// Page window and ordering. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub sort_by: TaskSortKey,
    pub sort_order: SortOrder,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: TaskSortKey::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

impl Pagination {
    /// Build from optional raw values, clamping `page >= 1` and
    /// `1 <= limit <= max_limit`.
    #[must_use]
    pub fn from_parts(
        page: Option<u32>,
        limit: Option<u32>,
        sort_by: Option<TaskSortKey>,
        sort_order: Option<SortOrder>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
            sort_by: sort_by.unwrap_or_default(),
            sort_order: sort_order.unwrap_or_default(),
        }
    }

    /// Number of rows to skip before this page.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.limit as u64
    }
}
