//! Unified error types for the calorie tracking engine.
//!
//! Only configuration, persistence and the remote food lookup can fail. The
//! nutrition and analytics functions in [`crate::core`] are total and never
//! return these errors.

use thiserror::Error;

/// Errors raised at the edges of the engine (config, storage, remote lookup).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON encoding or decoding of the persisted document failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An existing file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote food database could not be reached or returned garbage
    #[error("Remote lookup failed: {message}")]
    Remote {
        /// Description of the transport or decoding failure
        message: String,
    },

    /// A date string was not in `YYYY-MM-DD` / `YYYY-MM` form
    #[error("Invalid date: {value}")]
    InvalidDate {
        /// The rejected input
        value: String,
    },
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Remote {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
