//! Error types for the decoy secret model.

use thiserror::Error;

/// Errors that can occur in the decoy secret model.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid secret name format.
    #[error("invalid secret name: {reason}")]
    InvalidSecretName {
        /// The reason the name is invalid.
        reason: String,
    },

    /// The requested kind is not a decoy credential kind.
    #[error("not a credential kind: {kind}")]
    NotACredential {
        /// The offending kind.
        kind: String,
    },

    /// Secure randomness was unavailable during payload synthesis.
    #[error("payload generation failed: {reason}")]
    Generation {
        /// The reason the randomness source failed.
        reason: String,
    },
}

/// Result type alias for decoy secret operations.
pub type Result<T> = std::result::Result<T, Error>;
