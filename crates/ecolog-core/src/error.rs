//! Core error types for ecolog-core.
//!
//! This module defines the error hierarchy using thiserror. The progress
//! engine itself is total over well-formed inputs; everything here guards
//! the boundary (caller contract violations, storage, configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ecolog-core.
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
    QueryFailed(#[from] rusqlite::Error),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Row referenced an entity that does not exist
    #[error("Not found: {0}")]
    NotFound(String),
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
}

/// Caller contract violations rejected at the public boundary.
///
/// The engine's state transitions cannot fail on well-formed inputs;
/// malformed input is rejected here before it can corrupt cumulative totals.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An impact metric was negative
    #[error("Impact metric '{metric}' must be non-negative, got {value}")]
    NegativeMetric { metric: &'static str, value: f64 },

    /// An impact metric was NaN or infinite
    #[error("Impact metric '{metric}' must be finite")]
    NonFiniteMetric { metric: &'static str },

    /// A progress amount was negative
    #[error("Progress amount must be non-negative, got {0}")]
    NegativeAmount(f64),

    /// A challenge or achievement requirement was not positive
    #[error("Target '{field}' must be positive")]
    NonPositiveTarget { field: &'static str },

    /// A challenge reward was negative or non-finite
    #[error("Reward points must be a non-negative finite number, got {0}")]
    InvalidReward(f64),

    /// The activity does not belong to the profile it was applied to
    #[error("Activity owner {activity_owner} does not match profile {profile}")]
    OwnerMismatch {
        activity_owner: uuid::Uuid,
        profile: uuid::Uuid,
    },

    /// Joining a challenge that has already been joined or finished
    #[error("Challenge '{0}' has already been joined")]
    ChallengeAlreadyJoined(String),
}
