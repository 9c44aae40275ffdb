//! Error types for Tinsel

use thiserror::Error;

/// The main error type for Tinsel operations
///
/// Only the edges of the system produce these (config files, color strings,
/// exports). The frame loop itself never fails; see `Degradation` in
/// `tinsel-particles` for the non-fatal conditions it handles locally.
#[derive(Debug, Error)]
pub enum TinselError {
    #[error("Invalid color '{0}': expected #rrggbb or #rgb")]
    InvalidColor(String),

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type alias for Tinsel operations
pub type Result<T> = std::result::Result<T, TinselError>;

impl From<toml::de::Error> for TinselError {
    fn from(err: toml::de::Error) -> Self {
        TinselError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for TinselError {
    fn from(err: toml::ser::Error) -> Self {
        TinselError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for TinselError {
    fn from(err: serde_json::Error) -> Self {
        TinselError::JsonError(err.to_string())
    }
}
