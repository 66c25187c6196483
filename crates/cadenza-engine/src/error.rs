//! Engine error type.

use crate::SessionId;
use crate::store::StoreError;
use cadenza_config::ConfigError;
use cadenza_effects::EffectError;
use cadenza_index::IndexError;
use thiserror::Error;

/// Errors returned by [`Engine`](crate::Engine) operations.
///
/// Short buffer reads and writes are not errors; they surface as counts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No live session has this id
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// Operation needs samples and the session buffer holds none
    #[error("session {0} has no buffered samples")]
    EmptyBuffer(SessionId),

    /// Session options fall outside the configured ranges
    #[error("invalid session options: {reason}")]
    InvalidSession {
        /// What was wrong.
        reason: String,
    },

    /// Effect or chain was rejected before processing
    #[error(transparent)]
    Effect(#[from] EffectError),

    /// File index lookup or decode failed
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Engine configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Processed output could not be stored
    #[error("failed to persist processed audio: {source}")]
    Persist {
        /// Store error.
        #[source]
        source: StoreError,
    },

    /// Durable metadata store rejected the operation
    #[error("metadata store error: {source}")]
    MetadataStore {
        /// Store error.
        #[source]
        source: StoreError,
    },

    /// Operation needs a collaborator that was never attached
    #[error("no {0} attached to the engine")]
    NotConfigured(&'static str),
}

impl EngineError {
    /// Create an invalid session error.
    pub fn invalid_session(reason: impl Into<String>) -> Self {
        EngineError::InvalidSession {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::SessionNotFound(SessionId::new(7));
        assert_eq!(err.to_string(), "session not found: 7");

        let err: EngineError = EffectError::UnknownEffect("wah".to_string()).into();
        assert_eq!(err.to_string(), "unknown effect: wah");

        let err = EngineError::NotConfigured("decoder");
        assert_eq!(err.to_string(), "no decoder attached to the engine");

        let err = EngineError::EmptyBuffer(SessionId::new(2));
        assert_eq!(err.to_string(), "session 2 has no buffered samples");

        let err = EngineError::invalid_session("capacity 0");
        assert_eq!(err.to_string(), "invalid session options: capacity 0");
    }
}
