//! Error types for roster
//!
//! Every store operation surfaces the same error kind; callers recover per
//! operation rather than by classifying sub-kinds.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for store operations
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Record Errors
    // ==========================================================================
    #[error("Record '{id}' not found in collection '{collection}'")]
    RecordNotFound { collection: String, id: String },

    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Invalid {kind} '{value}': {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Reserved name '{name}' cannot be used")]
    ReservedName { name: String },

    // ==========================================================================
    // Query Errors
    // ==========================================================================
    #[error(transparent)]
    FilterParse(#[from] rosterq::ParseError),

    // ==========================================================================
    // IO Errors
    // ==========================================================================
    #[error("Failed to read file '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==========================================================================
    // Serialization Errors
    // ==========================================================================
    #[error("Failed to parse record YAML: {message}")]
    YamlParseError { message: String },

    #[error("Failed to serialize record to YAML: {message}")]
    YamlSerializeError { message: String },

    // ==========================================================================
    // Subscription Errors
    // ==========================================================================
    #[error("Subscription on collection '{collection}' failed: {message}")]
    SubscriptionFailed { collection: String, message: String },

    // ==========================================================================
    // Catch-all
    // ==========================================================================
    #[error("{0}")]
    Other(String),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Conversions from external error types
// =============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::YamlParseError {
            message: err.to_string(),
        }
    }
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Other(format!("File watcher error: {}", err))
    }
}

impl From<crate::validation::ValidationError> for Error {
    fn from(err: crate::validation::ValidationError) -> Self {
        match err {
            crate::validation::ValidationError::InvalidIdentifier(value, reason) => {
                Error::InvalidIdentifier {
                    kind: "identifier",
                    value,
                    reason,
                }
            }
            crate::validation::ValidationError::TooLong(value, _max) => Error::InvalidIdentifier {
                kind: "identifier",
                value,
                reason: "exceeds maximum length",
            },
            crate::validation::ValidationError::Empty => Error::InvalidIdentifier {
                kind: "identifier",
                value: String::new(),
                reason: "cannot be empty",
            },
            crate::validation::ValidationError::Reserved(name) => Error::ReservedName { name },
        }
    }
}

// =============================================================================
// Error Display Helpers
// =============================================================================

impl Error {
    /// Returns a user-friendly suggestion for fixing the error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::RecordNotFound { .. } => Some("Check the record ID and collection name"),
            Error::InvalidIdentifier { .. } => {
                Some("Use only letters, numbers, underscores, and hyphens")
            }
            Error::FilterParse(_) => {
                Some("Write conditions as: field == \"value\" and other >= 3")
            }
            Error::SubscriptionFailed { .. } => {
                Some("The subscription has ended; subscribe again to resume updates")
            }
            _ => None,
        }
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::RecordNotFound { .. }
                | Error::InvalidIdentifier { .. }
                | Error::ReservedName { .. }
                | Error::FilterParse(_)
        )
    }
}
