//! Error types for pdp-std

use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or saving a [`PdpConfig`](crate::PdpConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A field holds a value the PDP cannot use
    #[error("Invalid configuration: {field} {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}
