//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout Roster.
//! Every error maps to a stable error code and to the `ERROR` message class
//! when shown on the console.
//!
//! # Error Categories
//! - `DataAccess`: The store is unreachable or a query failed
//! - `NotFound`: A targeted row was absent at mutation time
//! - `Validation`: Malformed user input or query results
//! - `Misconfigured`: A dependency table that cannot be analyzed (fatal)
//! - `Config`: Configuration file or connection registry errors
//! - `Prompt`: The terminal prompt could not be shown or read
//!
//! A declined confirmation is not an error; it is reported as a
//! [`crate::workflow::DeletionOutcome::Cancelled`] outcome.

use thiserror::Error;

/// Main error type for Roster operations
#[derive(Error, Debug)]
pub enum RosterError {
    /// Underlying store unreachable or query failed
    #[error("Data access failed: {0}")]
    DataAccess(String),

    /// Targeted row absent at mutation time
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed input reaching the core
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Dependency table inconsistent with the store lookups
    #[error("Misconfigured dependency table: {0}")]
    Misconfigured(String),

    /// Configuration error (file not found, invalid JSON, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interactive prompt failed (no terminal, I/O error)
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl RosterError {
    /// Stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DataAccess(_) => "DATA_ACCESS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION",
            Self::Misconfigured(_) => "MISCONFIGURED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Prompt(_) => "PROMPT_FAILED",
        }
    }

    /// Whether the interactive loop must stop on this error
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Prompt(_) | Self::Misconfigured(_))
    }

    /// Human-readable error message
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Create a data access error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Create a not found error for `subject`, e.g. `"Employee #4"`
    pub fn not_found(subject: impl Into<String>) -> Self {
        Self::NotFound(subject.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a dependency table misconfiguration error
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::Misconfigured(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a prompt error
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt(message.into())
    }
}

impl From<dialoguer::Error> for RosterError {
    fn from(err: dialoguer::Error) -> Self {
        Self::prompt(err.to_string())
    }
}

/// Result type alias for Roster operations
pub type Result<T> = std::result::Result<T, RosterError>;
