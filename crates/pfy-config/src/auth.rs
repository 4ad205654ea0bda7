//! Access-token signing configuration.

use serde::{Deserialize, Serialize};

/// One day.
const fn default_access_ttl_secs() -> u64 {
    86_400
}

/// One year.
const fn default_refresh_ttl_secs() -> u64 {
    31_536_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 secret for access tokens.
    #[serde(default)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,

    /// HS256 secret for refresh tokens.
    #[serde(default)]
    pub refresh_secret: String,

    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_secs: default_access_ttl_secs(),
            refresh_secret: String::new(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
        }
    }
}

impl AuthConfig {
    /// Access tokens can be verified only when a secret is set.
    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = AuthConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.access_ttl_secs, 86_400);
        assert_eq!(config.refresh_ttl_secs, 31_536_000);
    }

    #[test]
    fn configured_with_secret() {
        let config = AuthConfig {
            jwt_secret: "s3cret".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
