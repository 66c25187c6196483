//! Durable collaborators the engine writes through to.
//!
//! Neither trait is implemented here; `cadenza-io` provides file-backed
//! versions and tests use in-memory ones.

use cadenza_index::{FileId, FileMetadata};

/// Error type returned by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Stores processed sample arrays and hands back where they went.
pub trait ProcessedStore: Send + Sync {
    /// Persists mono `samples` under `name` and returns a retrievable
    /// location (a path, URL or key).
    fn store(&self, name: &str, samples: &[f32], sample_rate: u32) -> Result<String, StoreError>;

    /// Deletes output previously returned by [`store`](Self::store).
    ///
    /// Called to roll back a chain whose later step failed to persist.
    fn remove(&self, location: &str) -> Result<(), StoreError> {
        let _ = location;
        Ok(())
    }
}

/// Durable record of every registered file.
///
/// The in-memory index is rebuilt from [`load_all`](Self::load_all) and
/// kept in sync through [`upsert`](Self::upsert) and [`delete`](Self::delete).
pub trait MetadataStore: Send + Sync {
    /// Every stored record.
    fn load_all(&self) -> Result<Vec<FileMetadata>, StoreError>;

    /// Inserts or replaces the record for `meta.id`.
    fn upsert(&self, meta: &FileMetadata) -> Result<(), StoreError>;

    /// Deletes the record for `id`. Returns `false` if there was none.
    fn delete(&self, id: &FileId) -> Result<bool, StoreError>;
}
