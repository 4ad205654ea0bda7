//! Due-date sweep schedule.

use std::time::Duration;

use pfy_core::enums::SweepTarget;
use serde::{Deserialize, Serialize};

const fn default_enabled() -> bool {
    true
}

/// Five minutes.
const fn default_interval_secs() -> u64 {
    300
}

/// One hour.
const fn default_lookahead_secs() -> u64 {
    3_600
}

const fn default_tick_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweeperConfig {
    /// Whether the server starts the background sweep.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between ticks.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Tasks due within this many seconds from now are reminded.
    #[serde(default = "default_lookahead_secs")]
    pub lookahead_secs: u64,

    /// Upper bound on a single tick.
    #[serde(default = "default_tick_timeout_secs")]
    pub tick_timeout_secs: u64,

    /// Which task statuses the sweep considers.
    #[serde(default)]
    pub target: SweepTarget,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
            lookahead_secs: default_lookahead_secs(),
            tick_timeout_secs: default_tick_timeout_secs(),
            target: SweepTarget::default(),
        }
    }
}

impl SweeperConfig {
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub const fn lookahead(&self) -> Duration {
        Duration::from_secs(self.lookahead_secs)
    }

    pub const fn tick_timeout(&self) -> Duration {
        Duration::from_secs(self.tick_timeout_secs)
    }
}
