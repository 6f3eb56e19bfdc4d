//! Error types
//!
//! `ServeError` covers a single request, `StartupError` covers bringing the process up.

use std::io;
use thiserror::Error;

/// Failure while producing a response for one request
#[derive(Error, Debug)]
pub enum ServeError {
    /// Route unmatched, filename rejected, or backing file absent
    #[error("{0}")]
    NotFound(String),

    /// The resource exists but could not be read
    #[error("failed to read '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Controller list could not be serialized
    #[error("failed to encode controller list: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ServeError {
    /// Map a read failure, treating a missing file as 404
    pub fn from_read(name: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound(format!("File not found: {name}"))
        } else {
            Self::Io {
                name: name.to_string(),
                source: err,
            }
        }
    }
}

/// Failure while loading configuration or binding the listener
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
