//! Error types for the rotation engine.

use snare_store::StoreError;
use thiserror::Error;

/// Errors that can abort the engine itself.
///
/// Per-object failures never surface here; they are converted into requeue
/// decisions at the reconciliation boundary. The only fatal condition is an
/// unusable store at startup.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The initial store probe failed, so the engine never started.
    #[error("initial store probe failed: {source}")]
    StartupProbe {
        /// The underlying store error.
        #[source]
        source: StoreError,
    },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_source() {
        let err = EngineError::StartupProbe {
            source: StoreError::Transient {
                reason: "connection refused".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "initial store probe failed: transient store error: connection refused"
        );
    }
}
