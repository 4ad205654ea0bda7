//! Task repository: CRUD, the aggregation listing, and the queries behind
//! the due-date sweep.

use chrono::{DateTime, Utc};

use pfy_core::entities::{Assignment, Attachment, Task};
use pfy_core::enums::{AssigneeKind, SweepTarget, TaskPriority, TaskStatus};
use pfy_core::ids::PREFIX_TASK;
use pfy_core::recipients::{ResolvedAssignee, TaskRecipients};
use pfy_core::responses::{Page, PageMeta, TaskDetail};
use pfy_core::views::TaskView;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_bool, get_count, get_opt_string, now, opt_value, parse_datetime,
    parse_enum, to_stored,
};
use crate::query::{TaskQuery, build_task_query, row_to_task_view, search_text};
use crate::service::PfyService;
use crate::updates::task::TaskUpdate;

const SELECT_COLS: &str = "id, title, description, status, priority, due_date, creator_id, \
     assignee_kind, assignee_id, category_id, attachment_name, attachment_url, attachment_mime, \
     attachment_size, due_date_notified, created_at, updated_at";

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    let kind: Option<AssigneeKind> = get_opt_string(row, 7)?
        .map(|k| parse_enum(&k))
        .transpose()?;
    let attachment = match (get_opt_string(row, 10)?, get_opt_string(row, 11)?) {
        (Some(file_name), Some(file_url)) => Some(Attachment {
            file_name,
            file_url,
            mime_type: get_opt_string(row, 12)?.unwrap_or_default(),
            size: row.get::<Option<i64>>(13)?,
        }),
        _ => None,
    };

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        priority: parse_enum(&row.get::<String>(4)?)?,
        due_date: parse_datetime(&row.get::<String>(5)?)?,
        creator_id: row.get(6)?,
        assignee: Assignment::from_parts(kind, get_opt_string(row, 8)?),
        category_id: get_opt_string(row, 9)?,
        attachment,
        due_date_notified: get_bool(row, 14)?,
        created_at: parse_datetime(&row.get::<String>(15)?)?,
        updated_at: parse_datetime(&row.get::<String>(16)?)?,
    })
}

fn attachment_values(attachment: Option<&Attachment>) -> [libsql::Value; 4] {
    attachment.map_or(
        [
            libsql::Value::Null,
            libsql::Value::Null,
            libsql::Value::Null,
            libsql::Value::Null,
        ],
        |a| {
            [
                a.file_name.clone().into(),
                a.file_url.clone().into(),
                a.mime_type.clone().into(),
                a.size.map_or(libsql::Value::Null, libsql::Value::Integer),
            ]
        },
    )
}

/// Input for [`PfyService::create_task`].
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: DateTime<Utc>,
    pub assignee: Assignment,
    pub category_id: Option<String>,
    pub attachment: Option<Attachment>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: None,
            priority: None,
            due_date,
            assignee: Assignment::Unassigned,
            category_id: None,
            attachment: None,
        }
    }
}

impl PfyService {
    /// Insert a task owned by `creator_id`.
    ///
    /// An assignee that does not exist is dropped to unassigned rather than
    /// failing the request.
    ///
    /// # Errors
    ///
    /// `Validation` on a blank title or an unknown category.
    pub async fn create_task(&self, creator_id: &str, new: NewTask) -> Result<Task, DatabaseError> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(DatabaseError::Validation("task title is required".into()));
        }
        if let Some(ref category_id) = new.category_id {
            self.ensure_category_exists(category_id).await?;
        }
        let assignee = self.checked_assignment(new.assignee).await?;

        let now = now();
        let ts = format_datetime(&now);
        let due_date = to_stored(new.due_date);
        let status = new.status.unwrap_or_default();
        let priority = new.priority.unwrap_or_default();
        let id = self.db().generate_id(PREFIX_TASK).await?;

        let [att_name, att_url, att_mime, att_size] = attachment_values(new.attachment.as_ref());
        let params: Vec<libsql::Value> = vec![
            id.clone().into(),
            title.clone().into(),
            new.description.clone().into(),
            status.as_str().into(),
            priority.as_str().into(),
            format_datetime(&due_date).into(),
            creator_id.into(),
            opt_value(assignee.kind().map(AssigneeKind::as_str)),
            opt_value(assignee.id()),
            opt_value(new.category_id.as_deref()),
            att_name,
            att_url,
            att_mime,
            att_size,
            ts.clone().into(),
            ts.into(),
            search_text(&title, &new.description).into(),
        ];
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO tasks ({SELECT_COLS}, search_text) VALUES \
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0, ?15, ?16, ?17)"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;

        tracing::debug!(task_id = %id, creator_id, "task created");

        Ok(Task {
            id,
            title,
            description: new.description,
            status,
            priority,
            due_date,
            creator_id: creator_id.to_string(),
            assignee,
            category_id: new.category_id,
            attachment: new.attachment,
            due_date_notified: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(&format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"), || [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_task(&row)
    }

    /// The task plus its top-level comment threads.
    pub async fn get_task_with_comments(&self, id: &str) -> Result<TaskDetail, DatabaseError> {
        let task = self.get_task(id).await?;
        let comments = self.list_comments(id).await?;
        Ok(TaskDetail { task, comments })
    }

    /// Apply `update` to the task. A changed due date clears the due-soon
    /// marker so the sweep can remind again for the new date.
    pub async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task, DatabaseError> {
        let current = self.get_task(id).await?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        let title = match update.title.as_deref().map(str::trim) {
            Some("") => return Err(DatabaseError::Validation("task title is required".into())),
            other => other,
        };
        if let Some(title) = title {
            sets.push(format!("title = ?{idx}"));
            params.push(title.into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(description.clone().into());
            idx += 1;
        }
        if title.is_some() || update.description.is_some() {
            let text = search_text(
                title.unwrap_or(&current.title),
                update.description.as_deref().unwrap_or(&current.description),
            );
            sets.push(format!("search_text = ?{idx}"));
            params.push(text.into());
            idx += 1;
        }
        if let Some(status) = update.status {
            sets.push(format!("status = ?{idx}"));
            params.push(status.as_str().into());
            idx += 1;
        }
        if let Some(priority) = update.priority {
            sets.push(format!("priority = ?{idx}"));
            params.push(priority.as_str().into());
            idx += 1;
        }
        if let Some(due_date) = update.due_date {
            let due_date = to_stored(due_date);
            sets.push(format!("due_date = ?{idx}"));
            params.push(format_datetime(&due_date).into());
            idx += 1;
            if due_date != current.due_date {
                sets.push("due_date_notified = 0".to_string());
            }
        }
        if let Some(assignee) = update.assignee {
            let assignee = self.checked_assignment(assignee).await?;
            sets.push(format!("assignee_kind = ?{idx}"));
            params.push(opt_value(assignee.kind().map(AssigneeKind::as_str)));
            idx += 1;
            sets.push(format!("assignee_id = ?{idx}"));
            params.push(opt_value(assignee.id()));
            idx += 1;
        }
        if let Some(ref category_id) = update.category_id {
            if let Some(category_id) = category_id {
                self.ensure_category_exists(category_id).await?;
            }
            sets.push(format!("category_id = ?{idx}"));
            params.push(opt_value(category_id.as_deref()));
            idx += 1;
        }
        if let Some(ref attachment) = update.attachment {
            let values = attachment_values(attachment.as_ref());
            for (column, value) in [
                "attachment_name",
                "attachment_url",
                "attachment_mime",
                "attachment_size",
            ]
            .into_iter()
            .zip(values)
            {
                sets.push(format!("{column} = ?{idx}"));
                params.push(value);
                idx += 1;
            }
        }

        if sets.is_empty() {
            return Ok(current);
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(format_datetime(&now()).into());
        idx += 1;
        params.push(id.into());

        let sql = format!("UPDATE tasks SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.get_task(id).await
    }

    /// Delete a task. Comments and notifications referencing it cascade.
    pub async fn delete_task(&self, id: &str) -> Result<Task, DatabaseError> {
        let current = self.get_task(id).await?;
        self.db()
            .execute_with("DELETE FROM tasks WHERE id = ?1", || [id])
            .await?;
        Ok(current)
    }

    /// Run the aggregation listing for one page.
    pub async fn query_tasks(&self, query: &TaskQuery) -> Result<Page<TaskView>, DatabaseError> {
        let plan = build_task_query(query);

        let mut rows = self
            .db()
            .query_with(&plan.count_sql, || {
                libsql::params_from_iter(plan.params.clone())
            })
            .await?;
        let total = match rows.next().await? {
            Some(row) => get_count(&row, 0)?,
            None => 0,
        };

        let mut rows = self
            .db()
            .query_with(&plan.select_sql, || {
                libsql::params_from_iter(plan.params.clone())
            })
            .await?;
        let mut data = Vec::new();
        while let Some(row) = rows.next().await? {
            data.push(row_to_task_view(&row)?);
        }

        Ok(Page {
            meta: PageMeta {
                page: plan.page,
                limit: plan.limit,
                total,
            },
            data,
        })
    }

    /// Tasks due in `[window_start, window_end)` whose reminder has not
    /// been sent, restricted to `target`. Oldest due date first.
    pub async fn due_tasks(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        target: SweepTarget,
    ) -> Result<Vec<Task>, DatabaseError> {
        let status_clause = match target {
            SweepTarget::Incomplete => "status != 'completed'",
            SweepTarget::Completed => "status = 'completed'",
        };
        let start = format_datetime(&to_stored(window_start));
        let end = format_datetime(&to_stored(window_end));

        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM tasks \
                     WHERE due_date_notified = 0 AND due_date >= ?1 AND due_date < ?2 \
                     AND {status_clause} ORDER BY due_date, rowid"
                ),
                || [start.as_str(), end.as_str()],
            )
            .await?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    /// Set the due-soon marker. Returns `false` if it was already set.
    pub async fn mark_due_notified(&self, id: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .db()
            .execute_with(
                "UPDATE tasks SET due_date_notified = 1 WHERE id = ?1 AND due_date_notified = 0",
                || [id],
            )
            .await?;
        Ok(changed > 0)
    }

    /// Resolve the assignee once so the notification path never has to
    /// look anything else up.
    ///
    /// A dangling user or group reference resolves to unassigned.
    pub async fn task_recipients(&self, task: &Task) -> Result<TaskRecipients, DatabaseError> {
        let assignee = match &task.assignee {
            Assignment::Unassigned => ResolvedAssignee::Unassigned,
            Assignment::User { id } => {
                if self.user_exists(id).await? {
                    ResolvedAssignee::User { id: id.clone() }
                } else {
                    tracing::warn!(task_id = %task.id, user_id = %id, "assigned user not found");
                    ResolvedAssignee::Unassigned
                }
            }
            Assignment::Group { id } => match self.get_group(id).await {
                Ok(group) => ResolvedAssignee::Group {
                    id: group.id,
                    members: group.members,
                },
                Err(DatabaseError::NoResult) => {
                    tracing::warn!(task_id = %task.id, group_id = %id, "assigned group not found");
                    ResolvedAssignee::Unassigned
                }
                Err(e) => return Err(e),
            },
        };

        Ok(TaskRecipients {
            task_id: task.id.clone(),
            title: task.title.clone(),
            creator_id: task.creator_id.clone(),
            assignee,
        })
    }

    async fn checked_assignment(&self, assignee: Assignment) -> Result<Assignment, DatabaseError> {
        let exists = match &assignee {
            Assignment::Unassigned => return Ok(assignee),
            Assignment::User { id } => self.user_exists(id).await?,
            Assignment::Group { id } => match self.get_group(id).await {
                Ok(_) => true,
                Err(DatabaseError::NoResult) => false,
                Err(e) => return Err(e),
            },
        };
        if exists {
            Ok(assignee)
        } else {
            tracing::warn!(?assignee, "dropping unknown assignee");
            Ok(Assignment::Unassigned)
        }
    }

    async fn ensure_category_exists(&self, id: &str) -> Result<(), DatabaseError> {
        match self.get_category(id).await {
            Ok(_) => Ok(()),
            Err(DatabaseError::NoResult) => {
                Err(DatabaseError::Validation(format!("unknown category '{id}'")))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TaskFilter;
    use crate::test_support::helpers::{seed_group, seed_user, test_service};
    use crate::updates::task::TaskUpdateBuilder;
    use chrono::{Duration, TimeZone};
    use pfy_core::enums::{SortOrder, TaskSortKey};
    use pfy_core::pagination::Pagination;
    use pfy_core::views::AssigneeView;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashSet;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn create_applies_defaults_and_roundtrips() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;

        let mut new = NewTask::new("  Write docs ", noon());
        new.attachment = Some(Attachment {
            file_name: "a.pdf".into(),
            file_url: "/uploads/a.pdf".into(),
            mime_type: "application/pdf".into(),
            size: Some(10),
        });
        let task = svc.create_task(&u.id, new).await.unwrap();

        assert_eq!(task.title, "Write docs");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Low);
        assert!(!task.due_date_notified);
        assert_eq!(svc.get_task(&task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn unknown_assignee_is_dropped() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let mut new = NewTask::new("T", noon());
        new.assignee = Assignment::Group {
            id: "grp-missing".into(),
        };
        let task = svc.create_task(&u.id, new).await.unwrap();
        assert_eq!(task.assignee, Assignment::Unassigned);
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let mut new = NewTask::new("T", noon());
        new.category_id = Some("cat-missing".into());
        assert!(matches!(
            svc.create_task(&u.id, new).await,
            Err(DatabaseError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn changing_due_date_resets_marker() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let task = svc.create_task(&u.id, NewTask::new("T", noon())).await.unwrap();
        assert!(svc.mark_due_notified(&task.id).await.unwrap());
        assert!(!svc.mark_due_notified(&task.id).await.unwrap());

        let same_date = TaskUpdateBuilder::new().due_date(noon()).build();
        let t = svc.update_task(&task.id, same_date).await.unwrap();
        assert!(t.due_date_notified);

        let moved = TaskUpdateBuilder::new()
            .due_date(noon() + Duration::days(1))
            .status(TaskStatus::InProgress)
            .build();
        let t = svc.update_task(&task.id, moved).await.unwrap();
        assert!(!t.due_date_notified);
        assert_eq!(t.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn update_can_clear_attachment_and_category() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let cat = svc.create_category(&u.id, "Ops").await.unwrap();
        let mut new = NewTask::new("T", noon());
        new.category_id = Some(cat.id.clone());
        new.attachment = Some(Attachment {
            file_name: "a".into(),
            file_url: "/a".into(),
            mime_type: "text/plain".into(),
            size: None,
        });
        let task = svc.create_task(&u.id, new).await.unwrap();

        let update = TaskUpdateBuilder::new()
            .attachment(None)
            .category_id(None)
            .build();
        let t = svc.update_task(&task.id, update).await.unwrap();
        assert_eq!(t.attachment, None);
        assert_eq!(t.category_id, None);
    }

    #[tokio::test]
    async fn delete_cascades_comments_and_notifications() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let task = svc.create_task(&u.id, NewTask::new("T", noon())).await.unwrap();
        svc.create_comment(&task.id, &u.id, "hi", None).await.unwrap();
        svc.record_notification(&u.id, &u.id, "m", "task_updated", &task.id)
            .await
            .unwrap();

        svc.delete_task(&task.id).await.unwrap();
        assert!(svc.get_task(&task.id).await.unwrap_err().is_not_found());
        assert_eq!(svc.count_comments(&task.id).await.unwrap(), 0);
        assert!(svc.list_notifications(&u.id).await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn pages_cover_all_matches_exactly_once() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let mut ids = HashSet::new();
        for i in 0..5 {
            let t = svc
                .create_task(&u.id, NewTask::new(format!("Task {i}"), noon()))
                .await
                .unwrap();
            ids.insert(t.id);
        }

        let mut seen = Vec::new();
        for page in 1..=4 {
            let query = TaskQuery {
                filter: TaskFilter::default(),
                pagination: Pagination {
                    page,
                    limit: 2,
                    sort_by: TaskSortKey::DueDate,
                    sort_order: SortOrder::Asc,
                },
            };
            let result = svc.query_tasks(&query).await.unwrap();
            assert_eq!(result.meta.total, 5);
            seen.extend(result.data.into_iter().map(|t| t.id));
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(seen.into_iter().collect::<HashSet<_>>(), ids);
    }

    #[tokio::test]
    async fn listing_populates_references_and_comment_count() {
        let svc = test_service().await;
        let creator = seed_user(&svc, "Ann").await;
        let m1 = seed_user(&svc, "Bob").await;
        let m2 = seed_user(&svc, "Cy").await;
        let group = seed_group(&svc, &creator.id, &[m2.id.as_str(), m1.id.as_str()]).await;
        let cat = svc.create_category(&creator.id, "Release").await.unwrap();

        let mut new = NewTask::new("Ship the release", noon());
        new.description = "Tag and publish".into();
        new.assignee = Assignment::Group {
            id: group.id.clone(),
        };
        new.category_id = Some(cat.id.clone());
        let task = svc.create_task(&creator.id, new).await.unwrap();
        svc.create_comment(&task.id, &m1.id, "on it", None).await.unwrap();
        svc.create_comment(&task.id, &m2.id, "me too", None).await.unwrap();
        svc.create_task(&creator.id, NewTask::new("Unrelated", noon()))
            .await
            .unwrap();

        let query = TaskQuery {
            filter: TaskFilter {
                search: Some("PUBLISH".into()),
                category_slug: Some("release".into()),
                ..TaskFilter::default()
            },
            pagination: Pagination::default(),
        };
        let page = svc.query_tasks(&query).await.unwrap();
        assert_eq!(page.meta.total, 1);
        let view = &page.data[0];
        assert_eq!(view.id, task.id);
        assert_eq!(view.comment_count, 2);
        assert_eq!(view.creator.as_ref().unwrap().full_name, "Ann");
        assert_eq!(view.category.as_ref().unwrap().slug, "release");
        match &view.assignee {
            AssigneeView::Group(g) => {
                let members: Vec<&str> = g.members.iter().map(|m| m.id.as_str()).collect();
                assert_eq!(members, vec![m2.id.as_str(), m1.id.as_str()]);
            }
            other => panic!("expected group assignee, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_and_priority_filters_match_any_of_set() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        for (status, priority) in [
            (TaskStatus::Todo, TaskPriority::High),
            (TaskStatus::InProgress, TaskPriority::Low),
            (TaskStatus::Completed, TaskPriority::High),
        ] {
            let mut new = NewTask::new("T", noon());
            new.status = Some(status);
            new.priority = Some(priority);
            svc.create_task(&u.id, new).await.unwrap();
        }

        let query = TaskQuery {
            filter: TaskFilter {
                statuses: vec![TaskStatus::Todo, TaskStatus::Completed],
                priorities: vec![TaskPriority::High],
                creator_id: Some(u.id.clone()),
                ..TaskFilter::default()
            },
            pagination: Pagination::default(),
        };
        let page = svc.query_tasks(&query).await.unwrap();
        assert_eq!(page.meta.total, 2);
        assert!(page.data.iter().all(|t| t.priority == TaskPriority::High));
    }

    #[tokio::test]
    async fn due_window_is_half_open_and_skips_notified() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let mk = |minutes: i64, status: TaskStatus| {
            let mut new = NewTask::new(format!("due+{minutes}"), noon() + Duration::minutes(minutes));
            new.status = Some(status);
            new
        };

        let soon = svc.create_task(&u.id, mk(30, TaskStatus::InProgress)).await.unwrap();
        svc.create_task(&u.id, mk(120, TaskStatus::Todo)).await.unwrap();
        let already = svc.create_task(&u.id, mk(10, TaskStatus::Todo)).await.unwrap();
        svc.mark_due_notified(&already.id).await.unwrap();
        svc.create_task(&u.id, mk(60, TaskStatus::Todo)).await.unwrap();
        let done = svc.create_task(&u.id, mk(20, TaskStatus::Completed)).await.unwrap();

        let end = noon() + Duration::hours(1);
        let due = svc.due_tasks(noon(), end, SweepTarget::Incomplete).await.unwrap();
        let ids: Vec<&str> = due.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![soon.id.as_str()]);

        let due = svc.due_tasks(noon(), end, SweepTarget::Completed).await.unwrap();
        let ids: Vec<&str> = due.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![done.id.as_str()]);
    }

    #[tokio::test]
    async fn recipients_resolve_group_members_and_dangling_refs() {
        let svc = test_service().await;
        let u1 = seed_user(&svc, "U One").await;
        let u2 = seed_user(&svc, "U Two").await;
        let u3 = seed_user(&svc, "U Three").await;
        let group = seed_group(&svc, &u1.id, &[u2.id.as_str(), u3.id.as_str(), u1.id.as_str()]).await;

        let mut new = NewTask::new("T", noon());
        new.assignee = Assignment::Group {
            id: group.id.clone(),
        };
        let task = svc.create_task(&u1.id, new).await.unwrap();

        let recipients = svc.task_recipients(&task).await.unwrap();
        assert_eq!(
            recipients.resolve(),
            vec![u1.id.clone(), u2.id.clone(), u3.id.clone()]
        );

        svc.delete_group(&u1.id, &group.id).await.unwrap();
        let recipients = svc.task_recipients(&task).await.unwrap();
        assert_eq!(recipients.assignee, ResolvedAssignee::Unassigned);
        assert_eq!(recipients.resolve(), vec![u1.id.clone()]);
    }

    #[rstest]
    #[case("überprüfung", 1)]
    #[case("ÜBERPRÜFUNG", 1)]
    #[case("Straße", 1)]
    #[case("STRASSE", 0)]
    #[case("bericht", 1)]
    #[tokio::test]
    async fn search_folds_non_ascii_case(#[case] term: &str, #[case] expected: u64) {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let mut new = NewTask::new("Überprüfung Straße", noon());
        new.description = "Wöchentlicher BERICHT".into();
        svc.create_task(&u.id, new).await.unwrap();

        let query = TaskQuery {
            filter: TaskFilter {
                search: Some(term.into()),
                ..TaskFilter::default()
            },
            pagination: Pagination::default(),
        };
        assert_eq!(svc.query_tasks(&query).await.unwrap().meta.total, expected);
    }

    #[tokio::test]
    async fn search_follows_title_and_description_edits() {
        let svc = test_service().await;
        let u = seed_user(&svc, "Ann").await;
        let task = svc.create_task(&u.id, NewTask::new("Draft", noon())).await.unwrap();

        let search = |term: &str| TaskQuery {
            filter: TaskFilter {
                search: Some(term.into()),
                ..TaskFilter::default()
            },
            pagination: Pagination::default(),
        };

        let update = TaskUpdateBuilder::new().title("Ångström calibration").build();
        svc.update_task(&task.id, update).await.unwrap();
        assert_eq!(svc.query_tasks(&search("ÅNGSTRÖM")).await.unwrap().meta.total, 1);
        assert_eq!(svc.query_tasks(&search("draft")).await.unwrap().meta.total, 0);

        let update = TaskUpdateBuilder::new().description("Élan vital").build();
        svc.update_task(&task.id, update).await.unwrap();
        assert_eq!(svc.query_tasks(&search("élan")).await.unwrap().meta.total, 1);
        assert_eq!(svc.query_tasks(&search("calibration")).await.unwrap().meta.total, 1);
    }
}
