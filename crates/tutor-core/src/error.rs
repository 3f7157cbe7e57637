//! Error types for the Tutor client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Tutor client.
///
/// The first four variants form the user-facing taxonomy: each carries the
/// string that should be shown inline for the failed operation. The remaining
/// variants describe where a failure came from before it is converted.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TutorError {
    /// Login or signup rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// History or conversation list could not be fetched
    #[error("Load failed: {0}")]
    Load(String),

    /// The ask call failed; the optimistic message was rolled back
    #[error("Send failed: {0}")]
    Send(String),

    /// Deletion failed; nothing was removed locally
    #[error("Delete failed: {0}")]
    Delete(String),

    /// Input rejected on the client before any request was made
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A token-bearing call was attempted without a session
    #[error("Not signed in")]
    Unauthenticated,

    /// The remote service could not be reached or answered with a failure status
    #[error("Remote error{}: {}", .status.map(|s| format!(" ({s})")).unwrap_or_default(), .detail.as_deref().unwrap_or("no detail"))]
    Remote {
        status: Option<u16>,
        detail: Option<String>,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TutorError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Remote error from a status code and an optional server detail.
    pub fn remote(status: Option<u16>, detail: Option<String>) -> Self {
        Self::Remote { status, detail }
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

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    pub fn is_send(&self) -> bool {
        matches!(self, Self::Send(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the server rejected the token (401/403).
    ///
    /// The session is left untouched when this happens; the caller only
    /// surfaces the message.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                status: Some(401) | Some(403),
                ..
            }
        )
    }

    // ============================================================================
    // User-facing conversion
    // ============================================================================

    /// Returns the string to show the user for this failure.
    ///
    /// A detail supplied by the remote service wins over `fallback`. Taxonomy
    /// and validation variants already carry their final text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Remote {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            Self::Auth(message)
            | Self::Load(message)
            | Self::Send(message)
            | Self::Delete(message)
            | Self::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Returns the inline message carried by a taxonomy variant, if any.
    pub fn inline_message(&self) -> Option<&str> {
        match self {
            Self::Auth(message)
            | Self::Load(message)
            | Self::Send(message)
            | Self::Delete(message)
            | Self::Validation(message) => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TutorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TutorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TutorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TutorError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TutorError>`.
pub type Result<T> = std::result::Result<T, TutorError>;
