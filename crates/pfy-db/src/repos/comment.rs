//! Task comment repository. Threads are derived from `parent_id`.

use std::collections::HashMap;

use pfy_core::entities::TaskComment;
use pfy_core::ids::PREFIX_COMMENT;
use pfy_core::views::{CommentThread, UserSummary};

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_bool, get_count, get_opt_string, now, opt_value, parse_datetime,
    parse_optional_datetime,
};
use crate::service::PfyService;

const SELECT_COLS: &str =
    "id, task_id, author_id, comment, is_edited, parent_id, last_edited_at, created_at, updated_at";

fn row_to_comment(row: &libsql::Row) -> Result<TaskComment, DatabaseError> {
    Ok(TaskComment {
        id: row.get(0)?,
        task_id: row.get(1)?,
        author_id: row.get(2)?,
        comment: row.get(3)?,
        is_edited: get_bool(row, 4)?,
        parent_id: get_opt_string(row, 5)?,
        replies: Vec::new(),
        last_edited_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

type Node = (TaskComment, Option<UserSummary>);

/// Nest comments under their parents. Input order (newest first) is kept at
/// every level.
fn build_threads(nodes: Vec<Node>) -> Vec<CommentThread> {
    fn attach(
        parent: Option<String>,
        by_parent: &mut HashMap<Option<String>, Vec<Node>>,
    ) -> Vec<CommentThread> {
        let Some(children) = by_parent.remove(&parent) else {
            return Vec::new();
        };
        children
            .into_iter()
            .map(|(mut comment, author)| {
                let reply_threads = attach(Some(comment.id.clone()), by_parent);
                comment.replies = reply_threads.iter().map(|t| t.comment.id.clone()).collect();
                CommentThread {
                    comment,
                    author,
                    reply_threads,
                }
            })
            .collect()
    }

    let mut by_parent: HashMap<Option<String>, Vec<Node>> = HashMap::new();
    for node in nodes {
        by_parent.entry(node.0.parent_id.clone()).or_default().push(node);
    }
    attach(None, &mut by_parent)
}

impl PfyService {
    /// Add a comment, or a reply when `parent_id` is given.
    ///
    /// # Errors
    ///
    /// `NoResult` if the task does not exist; `Validation` on empty text or
    /// a parent that belongs to another task.
    pub async fn create_comment(
        &self,
        task_id: &str,
        author_id: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> Result<TaskComment, DatabaseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DatabaseError::Validation("comment text is required".into()));
        }
        self.get_task(task_id).await?;
        if let Some(parent_id) = parent_id {
            let parent = match self.get_comment(parent_id).await {
                Ok(parent) => parent,
                Err(DatabaseError::NoResult) => {
                    return Err(DatabaseError::Validation(format!(
                        "parent comment '{parent_id}' not found"
                    )));
                }
                Err(e) => return Err(e),
            };
            if parent.task_id != task_id {
                return Err(DatabaseError::Validation(
                    "parent comment belongs to another task".into(),
                ));
            }
        }

        let now = now();
        let ts = format_datetime(&now);
        let id = self.db().generate_id(PREFIX_COMMENT).await?;

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO task_comments ({SELECT_COLS}) \
                     VALUES (?1, ?2, ?3, ?4, 0, ?5, NULL, ?6, ?6)"
                ),
                || {
                    libsql::params_from_iter(vec![
                        libsql::Value::from(id.clone()),
                        task_id.into(),
                        author_id.into(),
                        text.into(),
                        opt_value(parent_id),
                        ts.clone().into(),
                    ])
                },
            )
            .await?;

        Ok(TaskComment {
            id,
            task_id: task_id.to_string(),
            author_id: author_id.to_string(),
            comment: text.to_string(),
            is_edited: false,
            parent_id: parent_id.map(String::from),
            replies: Vec::new(),
            last_edited_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// A single comment with the ids of its direct replies, newest first.
    pub async fn get_comment(&self, id: &str) -> Result<TaskComment, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM task_comments WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let mut comment = row_to_comment(&row)?;

        let mut rows = self
            .db()
            .query_with(
                "SELECT id FROM task_comments WHERE parent_id = ?1 ORDER BY created_at DESC, rowid DESC",
                || [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            comment.replies.push(row.get::<String>(0)?);
        }
        Ok(comment)
    }

    /// Top-level comments of a task, newest first, with nested replies and
    /// author summaries.
    pub async fn list_comments(&self, task_id: &str) -> Result<Vec<CommentThread>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT c.id, c.task_id, c.author_id, c.comment, c.is_edited, c.parent_id, \
                 c.last_edited_at, c.created_at, c.updated_at, \
                 u.id, u.full_name, u.email, u.profile_image \
                 FROM task_comments c LEFT JOIN users u ON u.id = c.author_id \
                 WHERE c.task_id = ?1 ORDER BY c.created_at DESC, c.rowid DESC",
                || [task_id],
            )
            .await?;

        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await? {
            let comment = row_to_comment(&row)?;
            let author = match get_opt_string(&row, 9)? {
                Some(id) => Some(UserSummary {
                    id,
                    full_name: row.get(10)?,
                    email: row.get(11)?,
                    profile_image: get_opt_string(&row, 12)?,
                }),
                None => None,
            };
            nodes.push((comment, author));
        }
        Ok(build_threads(nodes))
    }

    /// # Errors
    ///
    /// `Forbidden` unless `author_id` wrote the comment.
    pub async fn update_comment(
        &self,
        id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<TaskComment, DatabaseError> {
        let current = self.get_comment(id).await?;
        if current.author_id != author_id {
            return Err(DatabaseError::Forbidden(
                "only the author may edit a comment".into(),
            ));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(DatabaseError::Validation("comment text is required".into()));
        }

        let ts = format_datetime(&now());
        self.db()
            .execute_with(
                "UPDATE task_comments SET comment = ?1, is_edited = 1, last_edited_at = ?2, \
                 updated_at = ?2 WHERE id = ?3",
                || libsql::params![text, ts.as_str(), id],
            )
            .await?;
        self.get_comment(id).await
    }

    /// Delete a comment and, through the parent cascade, its replies.
    pub async fn delete_comment(&self, id: &str, author_id: &str) -> Result<TaskComment, DatabaseError> {
        let current = self.get_comment(id).await?;
        if current.author_id != author_id {
            return Err(DatabaseError::Forbidden(
                "only the author may delete a comment".into(),
            ));
        }
        self.db()
            .execute_with("DELETE FROM task_comments WHERE id = ?1", || [id])
            .await?;
        Ok(current)
    }

    pub async fn count_comments(&self, task_id: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT COUNT(*) FROM task_comments WHERE task_id = ?1",
                || [task_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_count(&row, 0)
    }
}
