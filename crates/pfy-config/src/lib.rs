//! # pfy-config
//!
//! Layered configuration loading for Projectify using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PROJECTIFY_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `projectify.toml`
//! 4. User-level `~/.config/projectify/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PROJECTIFY_AUTH__JWT_SECRET` -> `auth.jwt_secret`,
//! `PROJECTIFY_SWEEPER__INTERVAL_SECS` -> `sweeper.interval_secs`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use pfy_config::PfyConfig;
//!
//! let config = PfyConfig::load_with_dotenv(None).expect("config");
//! if config.auth.is_configured() {
//!     println!("listening on {}", config.server.bind);
//! }
//! ```

mod auth;
mod database;
mod dispatch;
mod error;
mod general;
mod server;
mod sweeper;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use dispatch::DispatchConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use server::ServerConfig;
pub use sweeper::SweeperConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PfyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl PfyConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(extra_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(extra_file)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment(extra_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from("projectify.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit --config file
        if let Some(path) = extra_file {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("PROJECTIFY_").split("__"))
    }

    /// Reject values that would stall or spin the background sweep.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweeper.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sweeper.interval_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.sweeper.lookahead_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sweeper.lookahead_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.sweeper.tick_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sweeper.tick_timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.dispatch.recipient_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.recipient_timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.general.default_limit > self.general.max_limit {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: format!(
                    "{} exceeds general.max_limit {}",
                    self.general.default_limit, self.general.max_limit
                ),
            });
        }
        Ok(())
    }

    /// The auth section, or `NotConfigured` when no signing secret is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if `auth.jwt_secret` is empty.
    pub fn require_auth(&self) -> Result<&AuthConfig, ConfigError> {
        if self.auth.is_configured() {
            Ok(&self.auth)
        } else {
            Err(ConfigError::NotConfigured {
                section: "auth".into(),
            })
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("projectify").join("config.toml"))
    }
}
