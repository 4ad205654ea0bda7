//! HTTP listener configuration.

use serde::{Deserialize, Serialize};

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Origins allowed to open a live-channel connection. Empty allows any.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Whether a WebSocket `Origin` header value is acceptable.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        origin.is_some_and(|o| self.allowed_origins.iter().any(|a| a == o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_localhost() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:5000");
        assert!(config.origin_allowed(None));
    }

    #[test]
    fn origin_list_is_enforced() {
        let config = ServerConfig {
            allowed_origins: vec!["http://localhost:5173".into()],
            ..Default::default()
        };
        assert!(config.origin_allowed(Some("http://localhost:5173")));
        assert!(!config.origin_allowed(Some("https://evil.example")));
        assert!(!config.origin_allowed(None));
    }
}
