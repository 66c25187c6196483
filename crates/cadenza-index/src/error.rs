//! Error types for index lookups and decoding.

use crate::{DecodeError, FileId};
use thiserror::Error;

/// Errors raised by [`SharedFileIndex`](crate::SharedFileIndex).
#[derive(Debug, Error)]
pub enum IndexError {
    /// No record for the id
    #[error("file not found: {0}")]
    FileNotFound(FileId),

    /// Blob store could not deliver the raw bytes
    #[error("failed to fetch '{id}': {source}")]
    Fetch {
        /// File being fetched.
        id: FileId,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Decoder rejected the bytes
    #[error("failed to decode '{id}': {source}")]
    DecodeFailure {
        /// File being decoded.
        id: FileId,
        /// Decoder error.
        #[source]
        source: DecodeError,
    },

    /// Snapshot could not be (de)serialized
    #[error("invalid index snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_and_source() {
        let err = IndexError::FileNotFound(FileId::from("abc"));
        assert_eq!(err.to_string(), "file not found: abc");

        let err = IndexError::DecodeFailure {
            id: FileId::from("abc"),
            source: DecodeError::Unsupported("ogg".to_string()),
        };
        assert_eq!(err.to_string(), "failed to decode 'abc': unsupported format: ogg");
        assert!(err.source().is_some());
    }
}
