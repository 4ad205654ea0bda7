//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
const fn default_limit() -> u32 {
    50
}

/// Hard cap on page size.
const fn default_max_limit() -> u32 {
    200
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default page size for list endpoints.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Largest page size a client may request.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.max_limit, 200);
    }
}
