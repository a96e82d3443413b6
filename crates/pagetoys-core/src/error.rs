//! Core error types for pagetoys-core.
//!
//! Widgets are cosmetic, so most failures are logged and swallowed at the
//! call site. The types here cover the cases that do reach a caller:
//! storage, configuration, bad input and clicker rule violations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pagetoys-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Clicker game rule violations
    #[error("Clicker error: {0}")]
    Clicker(#[from] ClickerError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine or create the data directory
    #[error("Data directory unavailable at {path}: {message}")]
    DataDir { path: PathBuf, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Timestamp string in neither supported format
    #[error("Invalid timestamp '{0}': expected RFC 3339 or YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },
}

/// Clicker game errors. The display text is the tip shown to the player.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClickerError {
    #[error("材料不足，無法增加工人！")]
    CannotHire { worker: String },

    #[error("材料不足，無法升級！")]
    CannotUpgrade { item: String },

    #[error("unknown material: {0}")]
    UnknownMaterial(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
