//! # pfy-db
//!
//! libSQL database operations for Projectify.
//!
//! Holds every piece of durable state: users, groups and their ordered
//! members, categories, tasks, threaded comments, and notifications. The
//! task listing is served by the aggregation query in [`query`], built as a
//! pure plan and executed by [`service::PfyService::query_tasks`].
//!
//! Uses the `libsql` crate (C `SQLite` fork) in local-only mode.

pub mod error;
pub mod helpers;
mod migrations;
pub mod query;
pub mod repos;
pub mod retry;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;

use crate::retry::{RetryConfig, is_transient_lock_error};

/// Central database handle.
///
/// Wraps a libSQL database and a single connection. One connection is
/// shared by every caller, which also keeps `:memory:` databases coherent.
pub struct PfyDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    retry: RetryConfig,
}

impl PfyDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let pfy_db = Self {
            db,
            conn,
            retry: RetryConfig::default(),
        };
        pfy_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(pfy_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"tsk-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Execute a statement, retrying on transient lock contention.
    ///
    /// `make_params` is called once per attempt since params are consumed.
    ///
    /// # Errors
    ///
    /// Returns the last `DatabaseError` once attempts are exhausted, or the
    /// first non-transient error.
    pub async fn execute_with<P, F>(&self, sql: &str, make_params: F) -> Result<u64, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        let mut attempt = 1;
        loop {
            match self.conn.execute(sql, make_params()).await {
                Ok(n) => return Ok(n),
                Err(e) if is_transient_lock_error(&e) && attempt < self.retry.max_attempts => {
                    tracing::debug!(attempt, error = %e, "retrying locked write");
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Run a query, retrying on transient lock contention.
    ///
    /// # Errors
    ///
    /// Same policy as [`Self::execute_with`].
    pub async fn query_with<P, F>(
        &self,
        sql: &str,
        make_params: F,
    ) -> Result<libsql::Rows, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        let mut attempt = 1;
        loop {
            match self.conn.query(sql, make_params()).await {
                Ok(rows) => return Ok(rows),
                Err(e) if is_transient_lock_error(&e) && attempt < self.retry.max_attempts => {
                    tracing::debug!(attempt, error = %e, "retrying locked read");
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> PfyDb {
        PfyDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let tables = [
            "users",
            "user_groups",
            "group_members",
            "categories",
            "tasks",
            "task_comments",
            "notifications",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [*table],
                )
                .await
                .unwrap();
            assert!(rows.next().await.unwrap().is_some(), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        let err = db
            .conn()
            .execute(
                "INSERT INTO notifications (id, sender_id, receiver_id, message, notification_type, task_id, created_at, updated_at)
                 VALUES ('ntf-1', 'usr-x', 'usr-y', 'm', 't', 'tsk-z', 'a', 'a')",
                (),
            )
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn generate_id_has_prefix_and_is_unique() {
        let db = test_db().await;
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let id = db.generate_id("tsk").await.unwrap();
            assert!(id.starts_with("tsk-"));
            assert_eq!(id.len(), 12);
            assert!(seen.insert(id));
        }
    }

    #[tokio::test]
    async fn file_backed_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pfy.db");
        let path = path.to_str().unwrap();
        {
            let db = PfyDb::open_local(path).await.unwrap();
            db.execute_with(
                "INSERT INTO users (id, full_name, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
                || libsql::params!["usr-1", "Ada", "ada@example.com", "2026-01-01T00:00:00.000000Z"],
            )
            .await
            .unwrap();
        }
        let db = PfyDb::open_local(path).await.unwrap();
        let mut rows = db
            .query_with("SELECT COUNT(*) FROM users", || ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }
}
