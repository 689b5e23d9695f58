//! Error types for the object store gateway.

use thiserror::Error;

/// Errors that can occur at the object store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object does not exist (or was deleted concurrently).
    #[error("object not found: {name}")]
    NotFound {
        /// The qualified name of the missing object.
        name: String,
    },

    /// The supplied version token is stale; another writer got there first.
    ///
    /// The caller must re-fetch and repeat its whole read-modify-write step.
    #[error("version conflict on {name}: expected version {expected}")]
    Conflict {
        /// The qualified name of the contended object.
        name: String,
        /// The version the writer presented.
        expected: u64,
    },

    /// An object with this name already exists.
    #[error("object already exists: {name}")]
    AlreadyExists {
        /// The qualified name of the duplicate.
        name: String,
    },

    /// The store is unreachable or failing; the operation may succeed later.
    #[error("transient store error: {reason}")]
    Transient {
        /// Why the store call failed.
        reason: String,
    },
}

impl StoreError {
    /// True for errors worth retrying after a backoff.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
