//! Core error types for studytimer-core.
//!
//! Every error here is recoverable: engine commands that fail leave the
//! session untouched, and persistence failures are reported to the host
//! rather than aborting anything.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::Phase;

/// Core error type for studytimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session engine rejected a command
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Profile store rejected a mutation
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Persistence gateway failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Settings access failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors raised by the session engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Command is not valid in the current phase
    #[error("cannot {operation} while {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    /// Profile index does not exist in the store
    #[error("profile index {index} out of range (profiles: {len})")]
    ProfileNotFound { index: usize, len: usize },
}

/// Errors raised by profile store mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Store already holds the maximum number of profiles
    #[error("profile limit reached ({cap} profiles)")]
    CapacityExceeded { cap: usize },

    /// Deleting would leave the store empty
    #[error("at least one profile must remain")]
    LastProfileRemaining,

    /// Out of bounds
    #[error("profile index {index} out of bounds (profiles: {len})")]
    OutOfBounds { index: usize, len: usize },

    /// Profile failed validation
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Persistence gateway errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Nothing has been saved yet
    #[error("No saved state at {path}")]
    NotFound { path: PathBuf },

    /// Failed to load state
    #[error("Failed to load state from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save state
    #[error("Failed to save state to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Dotted-key settings access errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Key does not name a settings field
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
