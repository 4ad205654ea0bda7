//! Database error types for pfy-db.

use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned (entity not found).
    #[error("No result returned")]
    NoResult,

    /// Input rejected before touching the database.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness constraint would be violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The acting user may not perform this mutation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether this error means "the referenced row does not exist".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NoResult)
    }
}
