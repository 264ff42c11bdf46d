//! Error types for address configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading the address configuration.
///
/// Every variant is fatal at startup: the run never begins with a config it
/// could not fully validate.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}\ncreate a JSON file with the following format:\n{example}", .path.display())]
    NotFound { path: PathBuf, example: &'static str },

    /// The file exists but could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid JSON or has the wrong shape.
    #[error("invalid JSON in configuration file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// `mining_address` is missing.
    #[error("'mining_address' not found in configuration file")]
    MissingMiningAddress,

    /// `mining_address` is present but empty.
    #[error("'mining_address' cannot be empty")]
    EmptyMiningAddress,
}
