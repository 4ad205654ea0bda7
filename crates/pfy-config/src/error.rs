//! Errors raised while loading or checking `PfyConfig`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer (TOML file or `PROJECTIFY_*` variable) could not be read or
    /// did not match the expected shape.
    #[error("failed to load projectify configuration: {0}")]
    Figment(#[from] figment::Error),

    /// A section the server cannot start without is empty, e.g. `auth`
    /// with no signing secret.
    #[error("[{section}] is required but not set")]
    NotConfigured { section: String },

    /// A value outside its allowed range, e.g. a zero sweep interval.
    #[error("{field} is invalid: {reason}")]
    InvalidValue { field: String, reason: String },
}
