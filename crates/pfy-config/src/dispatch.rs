//! Notification fan-out limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_recipient_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Per-recipient bound on persisting and pushing one notification.
    #[serde(default = "default_recipient_timeout_ms")]
    pub recipient_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            recipient_timeout_ms: default_recipient_timeout_ms(),
        }
    }
}

impl DispatchConfig {
    pub const fn recipient_timeout(&self) -> Duration {
        Duration::from_millis(self.recipient_timeout_ms)
    }
}
