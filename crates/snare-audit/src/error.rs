//! Error types for the audit logging system.

use thiserror::Error;

/// Errors that can occur during audit logging operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to serialize an event.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
