//! Cadenza Index - the in-memory fast path over stored audio files.
//!
//! - [`FileIndex`] - arena-backed AVL tree keyed by [`FileId`], with
//!   per-file access counters, search, and JSON snapshots
//! - [`RecencyCache`] - LRU cache of [`DecodedAudio`]
//! - [`SharedFileIndex`] - both behind their own locks, decoding through
//!   the [`BlobStore`] and [`Decoder`] collaborators on a cache miss
//!
//! The index is built from, and kept in sync with, a durable metadata
//! store owned by the caller; it never replaces it.

mod cache;
mod error;
mod metadata;
mod shared;
mod source;
mod tree;

pub use cache::{DecodedAudio, RecencyCache};
pub use error::IndexError;
pub use metadata::{AccessStats, FileId, FileMetadata, FileProcessingEntry, now_ms};
pub use shared::{IndexStats, SharedFileIndex};
pub use source::{BlobStore, DecodeError, Decoder};
pub use tree::{FileIndex, IndexSnapshot, Iter, SnapshotEntry};
