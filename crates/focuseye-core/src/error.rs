//! Core error types for focuseye-core.
//!
//! None of these are fatal to the engines: the runtime logs them and keeps
//! going. They exist so the boundaries (settings store, command parser,
//! pointer query) can report what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focuseye-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings storage errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pointer position could not be queried
    #[error("Pointer query failed: {0}")]
    Pointer(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML encoding errors
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings storage errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load settings
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save settings
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid settings value
    #[error("Invalid settings value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown settings key
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// Settings directory could not be resolved
    #[error("Settings directory unavailable: {0}")]
    NoDataDir(String),
}

/// Command payload errors.
///
/// Returned by the command parser; the runtime drops the command and
/// leaves all state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command type: {0}")]
    UnknownType(String),

    #[error("missing 'type' field")]
    MissingType,

    #[error("malformed command: {0}")]
    Malformed(String),

    #[error("command {0} requires a payload")]
    MissingPayload(&'static str),

    #[error("invalid session phase: {0}")]
    InvalidPhase(String),

    #[error("invalid settings patch: {0}")]
    InvalidPatch(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
