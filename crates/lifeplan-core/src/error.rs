//! Core error types for lifeplan-core.
//!
//! The planning algorithms themselves never fail: they skip malformed input
//! and answer best effort. Errors only come from editing operations that name
//! unknown records, from parsing user input, and from config/snapshot I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lifeplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Snapshot storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Planner snapshot errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read snapshot at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Malformed `HH:MM` clock time
    #[error("Invalid clock time '{0}', expected HH:MM")]
    InvalidClockTime(String),

    /// Day index outside 0..=6
    #[error("Invalid day {0}, expected 0 (Mon) ..= 6 (Sun)")]
    InvalidDay(u8),

    /// Malformed week key
    #[error("Invalid week key '{0}', expected YYYY-Www")]
    InvalidWeekKey(String),

    /// Goal id not present
    #[error("Unknown goal: {0}")]
    UnknownGoal(String),

    /// System, project or step id not present
    #[error("Unknown owner: {0}")]
    UnknownOwner(String),

    /// Template key already used by the same owner
    #[error("Duplicate template key '{key}' for {owner}")]
    DuplicateTemplateKey { owner: String, key: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
