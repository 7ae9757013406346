//! Error types for regdesk.

use thiserror::Error;

/// A shared error type for the whole regdesk workspace.
///
/// Lookup misses and provider failures are separate variants so callers
/// (and tests) can tell them apart even though the terminal front end
/// collapses both into a single banner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegdeskError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A chat turn is already in flight for this session
    #[error("Session busy: '{session_id}' is already handling a message")]
    SessionBusy { session_id: String },

    /// Rejected user input (e.g. an empty chat message)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Completion provider failure (transport, HTTP status, malformed body, broken stream)
    #[error("Provider error: {message}")]
    Provider {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    /// A streamed turn was cancelled by its caller
    #[error("Request cancelled")]
    Cancelled,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Case fixture data failed validation
    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl RegdeskError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Provider error that is not tied to an HTTP status.
    pub fn provider(message: impl Into<String>, is_retryable: bool) -> Self {
        Self::Provider {
            status_code: None,
            message: message.into(),
            is_retryable,
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a provider failure
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// Check if this is a SessionBusy rejection
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::SessionBusy { .. })
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider {
                is_retryable: true,
                ..
            }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RegdeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RegdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RegdeskError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RegdeskError>`.
pub type Result<T> = std::result::Result<T, RegdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinct_from_provider() {
        let missing = RegdeskError::not_found("session", "abc");
        let failed = RegdeskError::provider("connection reset", true);

        assert!(missing.is_not_found());
        assert!(!missing.is_provider());
        assert!(failed.is_provider());
        assert!(!failed.is_not_found());
        assert_eq!(missing.to_string(), "Entity not found: session 'abc'");
    }

    #[test]
    fn retryable_only_for_flagged_provider_errors() {
        assert!(RegdeskError::provider("rate limited", true).is_retryable());
        assert!(!RegdeskError::provider("bad key", false).is_retryable());
        assert!(!RegdeskError::Cancelled.is_retryable());
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let err: RegdeskError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        match err {
            RegdeskError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
