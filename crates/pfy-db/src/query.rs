//! Task aggregation query builder.
//!
//! [`build_task_query`] is a pure function from filters and pagination to a
//! [`TaskQueryPlan`]: a page SELECT and an independent COUNT sharing the same
//! WHERE clause and bound parameters. Each selected row carries the task,
//! its creator summary, category summary, assignee (user, or group with
//! member summaries as a JSON array), and a correlated comment count. No
//! comment bodies are read.
//!
//! Sort keys come from the [`TaskSortKey`] whitelist, so no caller text ever
//! reaches ORDER BY. Every ordering ends with `t.rowid ASC`, which keeps ties
//! in insertion order and makes page windows disjoint.

use pfy_core::entities::Attachment;
use pfy_core::enums::{AssigneeKind, TaskPriority, TaskSortKey, TaskStatus};
use pfy_core::pagination::Pagination;
use pfy_core::views::{AssigneeView, CategorySummary, GroupView, TaskView, UserSummary};

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_count, get_opt_string, parse_datetime, parse_enum, parse_optional_json,
};

/// Filters for the task listing. Every set field is AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring over title OR description.
    pub search: Option<String>,
    /// Match any of these statuses. Empty means no constraint.
    pub statuses: Vec<TaskStatus>,
    /// Match any of these priorities. Empty means no constraint.
    pub priorities: Vec<TaskPriority>,
    pub creator_id: Option<String>,
    pub category_id: Option<String>,
    pub category_slug: Option<String>,
    /// Assigned user or group id.
    pub assignee_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub pagination: Pagination,
}

/// SQL and parameters for one page of the task listing.
#[derive(Debug, Clone)]
pub struct TaskQueryPlan {
    pub select_sql: String,
    pub count_sql: String,
    /// Bound to both statements.
    pub params: Vec<libsql::Value>,
    pub page: u32,
    pub limit: u32,
}

const FROM_JOINS: &str = "FROM tasks t \
     LEFT JOIN users cu ON cu.id = t.creator_id \
     LEFT JOIN categories c ON c.id = t.category_id \
     LEFT JOIN users au ON t.assignee_kind = 'user' AND au.id = t.assignee_id \
     LEFT JOIN user_groups g ON t.assignee_kind = 'group' AND g.id = t.assignee_id";

// Column order is load-bearing for `row_to_task_view`.
const VIEW_COLS: &str = "t.id, t.title, t.description, t.status, t.priority, t.due_date, \
     t.due_date_notified, t.attachment_name, t.attachment_url, t.attachment_mime, \
     t.attachment_size, t.created_at, t.updated_at, \
     cu.id, cu.full_name, cu.email, cu.profile_image, \
     c.id, c.title, c.slug, \
     t.assignee_kind, \
     au.id, au.full_name, au.email, au.profile_image, \
     g.id, g.title, g.image, \
     (SELECT json_group_array(json_object('id', m.id, 'fullName', m.full_name, \
         'email', m.email, 'profileImage', m.profile_image)) \
      FROM (SELECT u.id, u.full_name, u.email, u.profile_image \
            FROM group_members gm JOIN users u ON u.id = gm.user_id \
            WHERE gm.group_id = g.id ORDER BY gm.position) m) AS members_json, \
     (SELECT COUNT(*) FROM task_comments tc WHERE tc.task_id = t.id) AS comment_count";

/// Text stored in `tasks.search_text`, folded with full Unicode case mapping.
#[must_use]
pub fn search_text(title: &str, description: &str) -> String {
    format!("{title}\n{description}").to_lowercase()
}

/// Escape LIKE wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

const fn sort_expr(key: TaskSortKey) -> &'static str {
    match key {
        TaskSortKey::CreatedAt => "t.created_at",
        TaskSortKey::UpdatedAt => "t.updated_at",
        TaskSortKey::DueDate => "t.due_date",
        TaskSortKey::Title => "t.title COLLATE NOCASE",
        TaskSortKey::Priority => {
            "CASE t.priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END"
        }
        TaskSortKey::Status => {
            "CASE t.status WHEN 'todo' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END"
        }
    }
}

/// Build the page and count statements for `query`. Performs no I/O.
#[must_use]
pub fn build_task_query(query: &TaskQuery) -> TaskQueryPlan {
    let filter = &query.filter;
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();
    let mut idx = 1usize;

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        clauses.push(format!("t.search_text LIKE ?{idx} ESCAPE '\\'"));
        params.push(like_pattern(&term.to_lowercase()).into());
        idx += 1;
    }

    if !filter.statuses.is_empty() {
        let mut slots = Vec::with_capacity(filter.statuses.len());
        for status in &filter.statuses {
            slots.push(format!("?{idx}"));
            params.push(status.as_str().into());
            idx += 1;
        }
        clauses.push(format!("t.status IN ({})", slots.join(", ")));
    }

    if !filter.priorities.is_empty() {
        let mut slots = Vec::with_capacity(filter.priorities.len());
        for priority in &filter.priorities {
            slots.push(format!("?{idx}"));
            params.push(priority.as_str().into());
            idx += 1;
        }
        clauses.push(format!("t.priority IN ({})", slots.join(", ")));
    }

    let equalities = [
        ("t.creator_id", &filter.creator_id),
        ("t.category_id", &filter.category_id),
        ("c.slug", &filter.category_slug),
        ("t.assignee_id", &filter.assignee_id),
    ];
    for (column, value) in equalities {
        if let Some(value) = value {
            clauses.push(format!("{column} = ?{idx}"));
            params.push(value.clone().into());
            idx += 1;
        }
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let pagination = Pagination {
        page: query.pagination.page.max(1),
        limit: query.pagination.limit.max(1),
        ..query.pagination
    };
    let (page, limit) = (pagination.page, pagination.limit);
    let offset = pagination.skip();

    let select_sql = format!(
        "SELECT {VIEW_COLS} {FROM_JOINS}{where_sql} ORDER BY {} {}, t.rowid ASC LIMIT {limit} OFFSET {offset}",
        sort_expr(pagination.sort_by),
        pagination.sort_order.as_sql(),
    );
    let count_sql = format!(
        "SELECT COUNT(*) FROM tasks t LEFT JOIN categories c ON c.id = t.category_id{where_sql}"
    );

    TaskQueryPlan {
        select_sql,
        count_sql,
        params,
        page,
        limit,
    }
}

fn user_summary_at(row: &libsql::Row, start: i32) -> Result<Option<UserSummary>, DatabaseError> {
    let Some(id) = get_opt_string(row, start)? else {
        return Ok(None);
    };
    Ok(Some(UserSummary {
        id,
        full_name: row.get(start + 1)?,
        email: row.get(start + 2)?,
        profile_image: get_opt_string(row, start + 3)?,
    }))
}

/// Decode one row produced by [`TaskQueryPlan::select_sql`].
///
/// # Errors
///
/// Returns `DatabaseError` if a column is missing or malformed.
pub fn row_to_task_view(row: &libsql::Row) -> Result<TaskView, DatabaseError> {
    let attachment = match (get_opt_string(row, 7)?, get_opt_string(row, 8)?) {
        (Some(file_name), Some(file_url)) => Some(Attachment {
            file_name,
            file_url,
            mime_type: get_opt_string(row, 9)?.unwrap_or_default(),
            size: row.get::<Option<i64>>(10)?,
        }),
        _ => None,
    };

    let category = match get_opt_string(row, 17)? {
        Some(id) => Some(CategorySummary {
            id,
            title: row.get(18)?,
            slug: row.get(19)?,
        }),
        None => None,
    };

    let kind: Option<AssigneeKind> = get_opt_string(row, 20)?
        .map(|k| parse_enum(&k))
        .transpose()?;
    let assignee = match kind {
        Some(AssigneeKind::User) => {
            user_summary_at(row, 21)?.map_or(AssigneeView::Unassigned, AssigneeView::User)
        }
        Some(AssigneeKind::Group) => match get_opt_string(row, 25)? {
            Some(id) => {
                let members_json = get_opt_string(row, 28)?;
                let members: Vec<UserSummary> =
                    parse_optional_json(members_json.as_deref())?.unwrap_or_default();
                AssigneeView::Group(GroupView {
                    id,
                    title: row.get(26)?,
                    image: get_opt_string(row, 27)?,
                    members,
                })
            }
            None => AssigneeView::Unassigned,
        },
        None => AssigneeView::Unassigned,
    };

    Ok(TaskView {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        priority: parse_enum(&row.get::<String>(4)?)?,
        due_date: parse_datetime(&row.get::<String>(5)?)?,
        due_date_notified: get_bool(row, 6)?,
        attachment,
        creator: user_summary_at(row, 13)?,
        category,
        assignee,
        comment_count: get_count(row, 29)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}
