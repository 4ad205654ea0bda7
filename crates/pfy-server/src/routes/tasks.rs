//! `/api/v1/tasks`.
//!
//! A successful PATCH commits, answers, and then dispatches a
//! `task_updated` notification on a detached task. Dispatch failures are
//! logged there and never reach the response.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use pfy_config::GeneralConfig;
use pfy_core::entities::{Assignment, Attachment, TASK_UPDATED, Task};
use pfy_core::enums::{SortOrder, TaskPriority, TaskSortKey, TaskStatus};
use pfy_core::pagination::Pagination;
use pfy_db::query::{TaskFilter, TaskQuery};
use pfy_db::repos::task::NewTask;
use pfy_db::updates::task::TaskUpdate;
use pfy_notify::Dispatcher;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::envelope::{ok, paged};
use crate::error::{ApiError, ApiResult};
use crate::routes::explicit_null;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/my-tasks", get(my_tasks))
        .route("/{id}", get(get_task).patch(update_task).delete(delete_task))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub assignee: Assignment,
    pub category_id: Option<String>,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee: Option<Assignment>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub category_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub attachment: Option<Option<Attachment>>,
}

impl From<UpdateTaskBody> for TaskUpdate {
    fn from(body: UpdateTaskBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            status: body.status,
            priority: body.priority,
            due_date: body.due_date,
            assignee: body.assignee,
            category_id: body.category_id,
            attachment: body.attachment,
        }
    }
}

/// Listing query string. Multi-valued filters are comma separated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    pub search_term: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub creator: Option<String>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub assignee: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn parse_list<T>(
    raw: Option<&str>,
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> ApiResult<Vec<T>> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            parse(s).ok_or_else(|| ApiError::invalid_field(field, format!("invalid {field} '{s}'")))
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TaskListParams {
    /// Validate and convert to a query. Unknown sort keys, statuses, and
    /// priorities are rejected.
    pub fn into_query(self, general: &GeneralConfig) -> ApiResult<TaskQuery> {
        let statuses = parse_list(self.status.as_deref(), "status", TaskStatus::parse)?;
        let priorities = parse_list(self.priority.as_deref(), "priority", TaskPriority::parse)?;
        let sort_by = match non_blank(self.sort_by) {
            Some(raw) => Some(TaskSortKey::parse(&raw).ok_or_else(|| {
                ApiError::invalid_field("sortBy", format!("unknown sort key '{raw}'"))
            })?),
            None => None,
        };
        let sort_order = match non_blank(self.sort_order) {
            Some(raw) => Some(SortOrder::parse(&raw).ok_or_else(|| {
                ApiError::invalid_field("sortOrder", format!("invalid sort order '{raw}'"))
            })?),
            None => None,
        };

        Ok(TaskQuery {
            filter: TaskFilter {
                search: non_blank(self.search_term),
                statuses,
                priorities,
                creator_id: non_blank(self.creator),
                category_id: non_blank(self.category),
                category_slug: non_blank(self.slug),
                assignee_id: non_blank(self.assignee),
            },
            pagination: Pagination::from_parts(
                self.page,
                self.limit,
                sort_by,
                sort_order,
                general.default_limit,
                general.max_limit,
            ),
        })
    }
}

/// Message recorded for a task update.
pub fn update_message(task: &Task) -> String {
    format!("Task \"{}\" was updated", task.title)
}

fn spawn_update_notice(dispatcher: Dispatcher, task: Task) {
    tokio::spawn(async move {
        let message = update_message(&task);
        match dispatcher.notify_task(&task.id, &message, TASK_UPDATED).await {
            Ok(report) => tracing::debug!(
                task_id = %task.id,
                persisted = report.persisted(),
                failed = report.failed.len(),
                "update notice dispatched"
            ),
            Err(error) => tracing::warn!(%error, task_id = %task.id, "update notice failed"),
        }
    });
}

async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateTaskBody>,
) -> ApiResult<impl IntoResponse> {
    let new = NewTask {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        due_date: body.due_date,
        assignee: body.assignee,
        category_id: non_blank(body.category_id),
        attachment: body.attachment,
    };
    let task = state.service.create_task(user.id(), new).await?;
    Ok(ok("Task created successfully", task))
}

async fn list_tasks(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<TaskListParams>,
) -> ApiResult<impl IntoResponse> {
    let query = params.into_query(&state.config.general)?;
    let page = state.service.query_tasks(&query).await?;
    Ok(paged("Tasks retrieved successfully", page))
}

async fn my_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<TaskListParams>,
) -> ApiResult<impl IntoResponse> {
    let mut query = params.into_query(&state.config.general)?;
    query.filter.creator_id = Some(user.id().to_string());
    let page = state.service.query_tasks(&query).await?;
    Ok(paged("Tasks retrieved successfully", page))
}

async fn get_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let detail = state.service.get_task_with_comments(&id).await?;
    Ok(ok("Task retrieved successfully", detail))
}

async fn update_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaskBody>,
) -> ApiResult<impl IntoResponse> {
    let task = state.service.update_task(&id, body.into()).await?;
    spawn_update_notice(state.dispatcher.clone(), task.clone());
    Ok(ok("Task updated successfully", task))
}

async fn delete_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state.service.delete_task(&id).await?;
    Ok(ok("Task deleted successfully", task))
}
