//! Retry logic for transient lock contention.
//!
//! A file-backed database shared by the request path and the background
//! sweep can briefly report `SQLITE_BUSY` / "database is locked" while the
//! other side holds a write lock. These resolve on their own within
//! milliseconds, so statements issued through `PfyDb::execute_with` and
//! `PfyDb::query_with` are retried with exponential backoff.

use std::time::Duration;

/// Configuration for retry behavior on transient lock errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), doubling each time.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect transient lock contention.
///
/// The predicate is intentionally narrow to avoid retrying genuine
/// SQL or constraint errors.
pub fn is_transient_lock_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked") || msg.contains("SQLITE_BUSY")
}
