//! Domain error types
//!
//! This module defines the error hierarchy for Scrub.
//! Errors are domain-specific and don't expose third-party types; adapters
//! translate driver errors into these variants before they reach the processors.

use thiserror::Error;

/// Main Scrub error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum ScrubError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A column depends on itself, directly or through other columns
    #[error("Circular dependency detected in table '{table}': {column}")]
    CircularDependency {
        /// Table owning the offending column
        table: String,
        /// Column found on the active recursion stack
        column: String,
    },

    /// Database-related errors (generic)
    #[error("Database error: {0}")]
    Database(String),

    /// A write violated a unique constraint
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// A uniqueness filter counter saturated while `raise_on_overflow` was set
    #[error("Uniqueness filter overflow: {0}")]
    FilterOverflow(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ScrubError {
    /// Returns `true` if this error is a write-time unique constraint violation.
    ///
    /// Live mode retries the whole row cycle on these.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, ScrubError::DuplicateKey(_))
    }

    /// Returns `true` if this error comes from the transport rather than the statement.
    pub fn is_connection(&self) -> bool {
        matches!(self, ScrubError::Connection(_))
    }

    /// Returns `true` for errors raised while loading or validating configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScrubError::Configuration(_) | ScrubError::CircularDependency { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ScrubError {
    fn from(err: std::io::Error) -> Self {
        ScrubError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ScrubError {
    fn from(err: serde_json::Error) -> Self {
        ScrubError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ScrubError {
    fn from(err: toml::de::Error) -> Self {
        ScrubError::Configuration(format!("TOML parse error: {err}"))
    }
}
