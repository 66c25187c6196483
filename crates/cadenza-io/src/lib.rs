//! File-backed collaborators for the cadenza engine.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`], [`write_wav`] and their in-memory
//!   counterparts [`decode_wav`] / [`encode_wav`]
//! - **Decoding**: [`WavDecoder`], the index's cache-miss decoder
//! - **Storage**: [`WavStore`] for processed output, [`FsBlobStore`] for raw
//!   file bytes, [`JsonMetadataStore`] as the durable file record store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cadenza_config::EngineConfig;
//! use cadenza_engine::Engine;
//! use cadenza_io::{FsBlobStore, JsonMetadataStore, WavDecoder, WavStore};
//!
//! let engine = Engine::new(EngineConfig::default())?
//!     .with_decoder(Arc::new(WavDecoder))
//!     .with_blob_store(Arc::new(FsBlobStore::with_root("uploads")))
//!     .with_processed_store(Arc::new(WavStore::new("processed")))
//!     .with_metadata_store(Arc::new(JsonMetadataStore::open("files.json")?));
//! engine.load_index()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decoder;
mod metadata;
mod store;
mod wav;

pub use decoder::WavDecoder;
pub use metadata::JsonMetadataStore;
pub use store::{FsBlobStore, WavStore};
pub use wav::{
    WavFormat, WavInfo, WavSpec, decode_wav, encode_wav, read_wav, read_wav_info, wav_metadata,
    write_wav,
};

use std::path::{Path, PathBuf};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Filesystem error.
    #[error("failed to access '{path}': {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Metadata file is not valid JSON.
    #[error("invalid metadata file '{path}': {source}")]
    Json {
        /// Path of the store file.
        path: PathBuf,
        /// Parse or encode error.
        #[source]
        source: serde_json::Error,
    },

    /// The audio uses an encoding this crate does not read.
    #[error("unsupported format: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create an I/O error for `path`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a JSON error for `path`.
    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
