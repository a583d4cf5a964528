//! Collaborator-specific error types.

use thiserror::Error;

/// Result type for collaborator operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the catalog, query, AI, persistence, and export
/// collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport-level failure reaching the collaborator.
    #[error("network error: {0}")]
    Network(String),

    /// The collaborator returned an error response.
    #[error("service error: {message} (code: {code})")]
    Remote {
        /// Error code from the collaborator.
        code: String,
        /// Human-readable error message.
        message: String,
    },

    /// Failed to serialize a request payload.
    #[error("failed to serialize request: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to deserialize a response payload.
    #[error("failed to deserialize response: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// Request timed out waiting for a response.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The target entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Spreadsheet write failed.
    #[error("spreadsheet write failed: {0}")]
    Export(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Create a remote error from an error response.
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether the collaborator reported the target entity missing. Drives
    /// the update-falls-back-to-create recovery in persistence.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Remote { code, .. } => code == "404" || code == "not_found",
            _ => false,
        }
    }

    /// Whether retrying the same call might succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }
}
