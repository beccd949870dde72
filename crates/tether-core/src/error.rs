//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading or validating `tether.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid label key {key:?}: {reason}")]
    InvalidLabelKey { key: String, reason: String },

    #[error("default prefer weight {0} is outside 1..=100")]
    InvalidWeight(i32),

    #[error("label pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
