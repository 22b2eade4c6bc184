//! Error types for the survey.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flow::step::Step;

/// A shared error type for the entire survey.
///
/// None of these are fatal to the process. Gate failures are normally
/// prevented by the front-end checking `can_advance()` first, and backend
/// failures are swallowed at the submission boundary.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SurveyError {
    /// A transition's precondition is unmet
    #[error("Transition blocked at {step}: {reason}")]
    TransitionBlocked { step: Step, reason: String },

    /// A field update was issued by a step that does not own the field
    #[error("Field '{field}' belongs to {owner}, but the active step is {active}")]
    FieldNotOwned {
        field: &'static str,
        owner: Step,
        active: Step,
    },

    /// A field value is out of its allowed range
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// A clarifying response names a question that was not shown
    #[error("Unknown clarifying question: {0}")]
    UnknownQuestion(String),

    /// A second submission was attempted while one is outstanding
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// The record store failed its health check
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A record store write failed
    #[error("Backend write failed during {operation}: {message}")]
    BackendWrite {
        operation: &'static str,
        message: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SurveyError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a TransitionBlocked error
    pub fn blocked(step: Step, reason: impl Into<String>) -> Self {
        Self::TransitionBlocked {
            step,
            reason: reason.into(),
        }
    }

    /// Creates an InvalidValue error
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }

    /// Creates a BackendWrite error
    pub fn backend_write(operation: &'static str, message: impl Into<String>) -> Self {
        Self::BackendWrite {
            operation,
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a gate failure
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::TransitionBlocked { .. })
    }

    /// Check if this error came from the record store
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_) | Self::BackendWrite { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SurveyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SurveyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SurveyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SurveyError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for SurveyError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, SurveyError>`.
pub type Result<T> = std::result::Result<T, SurveyError>;
