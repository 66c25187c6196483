//! Collaborators consulted on a cache miss.

use crate::{DecodedAudio, FileMetadata};
use thiserror::Error;

/// Failure reported by a [`Decoder`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Container or codec not handled
    #[error("unsupported format: {0}")]
    Unsupported(String),

    /// Bytes do not form valid audio
    #[error("malformed audio data: {0}")]
    Malformed(String),

    /// Anything else the decoder raised
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Turns raw file bytes into mono samples.
pub trait Decoder: Send + Sync {
    /// Decodes `raw`. `format_hint` is the file's lowercase extension.
    fn decode(&self, raw: &[u8], format_hint: &str) -> Result<DecodedAudio, DecodeError>;
}

/// Delivers the stored bytes of an indexed file.
pub trait BlobStore: Send + Sync {
    /// Reads the file described by `meta`. May block on I/O.
    fn fetch(&self, meta: &FileMetadata) -> std::io::Result<Vec<u8>>;
}
