//! Error types for crossforge
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for crossforge
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Unknown build target: {0}")]
    UnknownTarget(String),
}

/// Result type alias for crossforge core operations
pub type Result<T> = std::result::Result<T, Error>;
