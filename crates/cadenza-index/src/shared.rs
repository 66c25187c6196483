//! Process-wide index: tree behind a reader-writer lock, cache behind its
//! own mutex.
//!
//! Lock discipline:
//! - `find`/`search`/listing take the tree read lock; lookups run in parallel.
//! - `insert`/`remove` take the tree write lock (rotations).
//! - When both are needed the tree lock is taken first, then the cache
//!   mutex. Neither is held across fetch or decode.
//! - Decoded audio is cached only if the record still carries the revision
//!   it had before the fetch, checked under the tree read lock.

use crate::{
    AccessStats, BlobStore, DecodedAudio, Decoder, FileId, FileIndex, FileMetadata,
    FileProcessingEntry, IndexError, IndexSnapshot, RecencyCache,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;

/// Index-wide counters.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Number of indexed files.
    pub total_files: usize,
    /// Sum of file sizes.
    pub total_size_bytes: u64,
    /// Mean file size, 0 when empty.
    pub average_size_bytes: f64,
    /// Tree height.
    pub height: u32,
    /// Decoded files currently cached.
    pub cache_entries: usize,
    /// Cache capacity.
    pub cache_capacity: usize,
    /// Cache hit rate so far.
    pub cache_hit_rate: f64,
}

/// Thread-safe [`FileIndex`] with a decoded-audio [`RecencyCache`].
#[derive(Debug)]
pub struct SharedFileIndex {
    tree: RwLock<FileIndex>,
    cache: Mutex<RecencyCache>,
}

impl SharedFileIndex {
    /// Creates an empty index whose cache holds `cache_capacity` files.
    pub fn new(cache_capacity: usize) -> Self {
        Self::from_index(FileIndex::new(), cache_capacity)
    }

    /// Wraps an existing tree.
    pub fn from_index(index: FileIndex, cache_capacity: usize) -> Self {
        Self {
            tree: RwLock::new(index),
            cache: Mutex::new(RecencyCache::new(cache_capacity)),
        }
    }

    /// Inserts or replaces a record. A replaced file's cached audio is
    /// dropped.
    pub fn insert(&self, meta: FileMetadata) -> Option<FileMetadata> {
        let id = meta.id.clone();
        let mut tree = self.tree.write();
        let replaced = tree.insert(meta);
        if replaced.is_some() {
            self.cache.lock().remove(&id);
        }
        replaced
    }

    /// Removes a record and its cached audio.
    pub fn remove(&self, id: &FileId) -> Option<FileMetadata> {
        let mut tree = self.tree.write();
        let removed = tree.remove(id);
        self.cache.lock().remove(id);
        removed
    }

    /// Looks up a record, counting the access.
    pub fn find(&self, id: &FileId) -> Option<FileMetadata> {
        self.tree.read().find(id).cloned()
    }

    /// Looks up a record, or fails with [`IndexError::FileNotFound`].
    pub fn require(&self, id: &FileId) -> Result<FileMetadata, IndexError> {
        self.find(id)
            .ok_or_else(|| IndexError::FileNotFound(id.clone()))
    }

    /// Returns `true` if `id` is indexed.
    pub fn contains(&self, id: &FileId) -> bool {
        self.tree.read().contains(id)
    }

    /// Access counters for `id`.
    pub fn access_stats(&self, id: &FileId) -> Option<AccessStats> {
        self.tree.read().access_stats(id)
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// Every record in id order.
    pub fn in_order(&self) -> Vec<FileMetadata> {
        self.tree.read().in_order()
    }

    /// See [`FileIndex::search`].
    pub fn search(&self, query: &str, tags: &[String], limit: usize) -> Vec<FileMetadata> {
        self.tree.read().search(query, tags, limit)
    }

    /// See [`FileIndex::popular`].
    pub fn popular(&self, limit: usize) -> Vec<(FileMetadata, AccessStats)> {
        self.tree.read().popular(limit)
    }

    /// See [`FileIndex::recent`].
    pub fn recent(&self, limit: usize) -> Vec<FileMetadata> {
        self.tree.read().recent(limit)
    }

    /// Returns decoded audio for `id`, decoding on a cache miss.
    ///
    /// Fetch and decode run with no lock held, so two threads missing on
    /// the same id at once may both decode it. If the record is replaced or
    /// removed meanwhile, the decoded audio is returned to this caller but
    /// not cached.
    pub fn get_or_decode(
        &self,
        id: &FileId,
        store: &dyn BlobStore,
        decoder: &dyn Decoder,
    ) -> Result<Arc<DecodedAudio>, IndexError> {
        if let Some(audio) = self.cache.lock().get(id) {
            tracing::debug!(file = %id, "cache hit");
            return Ok(audio);
        }

        let (meta, revision) = {
            let tree = self.tree.read();
            let meta = tree
                .find(id)
                .cloned()
                .ok_or_else(|| IndexError::FileNotFound(id.clone()))?;
            (meta, tree.revision(id))
        };
        tracing::debug!(file = %id, path = %meta.path, "cache miss, decoding");

        let raw = store.fetch(&meta).map_err(|source| IndexError::Fetch {
            id: id.clone(),
            source,
        })?;
        let audio = decoder
            .decode(&raw, &meta.format)
            .map_err(|source| IndexError::DecodeFailure {
                id: id.clone(),
                source,
            })?;
        let audio = Arc::new(audio);

        let tree = self.tree.read();
        if tree.revision(id) == revision {
            if let Some(evicted) = self.cache.lock().insert(id.clone(), Arc::clone(&audio)) {
                tracing::debug!(file = %evicted, "evicted from cache");
            }
        } else {
            tracing::debug!(file = %id, "record changed during decode, not caching");
        }
        Ok(audio)
    }

    /// Appends a processing entry to a file's history and returns the
    /// updated record. Cached audio is kept.
    pub fn record_processing(
        &self,
        id: &FileId,
        entry: FileProcessingEntry,
        cap: usize,
    ) -> Option<FileMetadata> {
        self.tree.write().record_processing(id, entry, cap)
    }

    /// Returns `true` if decoded audio for `id` is cached.
    pub fn is_cached(&self, id: &FileId) -> bool {
        self.cache.lock().contains(id)
    }

    /// Cached ids, most recent first.
    pub fn cached_ids(&self) -> Vec<FileId> {
        self.cache.lock().keys()
    }

    /// Drops all cached audio.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    /// Index-wide counters.
    pub fn stats(&self) -> IndexStats {
        let (total_files, total_size_bytes, height) = {
            let tree = self.tree.read();
            (tree.len(), tree.total_size_bytes(), tree.height())
        };
        let cache = self.cache.lock();
        IndexStats {
            total_files,
            total_size_bytes,
            average_size_bytes: if total_files == 0 {
                0.0
            } else {
                total_size_bytes as f64 / total_files as f64
            },
            height,
            cache_entries: cache.len(),
            cache_capacity: cache.capacity(),
            cache_hit_rate: cache.hit_rate(),
        }
    }

    /// Captures the tree.
    pub fn snapshot(&self) -> IndexSnapshot {
        self.tree.read().snapshot()
    }

    /// Replaces the whole tree with `files`, rebuilt balanced, and empties
    /// the cache.
    pub fn replace_all(&self, files: Vec<FileMetadata>) {
        self.swap_tree(FileIndex::from_files(files));
    }

    /// Replaces the tree with a snapshot and empties the cache.
    pub fn restore(&self, snapshot: IndexSnapshot) {
        self.swap_tree(FileIndex::from_snapshot(snapshot));
    }

    fn swap_tree(&self, mut rebuilt: FileIndex) {
        let mut tree = self.tree.write();
        rebuilt.rebase_revisions(tree.last_revision());
        *tree = rebuilt;
        self.cache.lock().clear();
    }

    /// Serializes a snapshot as JSON.
    pub fn to_json(&self) -> Result<String, IndexError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Replaces the tree from a JSON snapshot.
    pub fn restore_json(&self, json: &str) -> Result<(), IndexError> {
        let snapshot: IndexSnapshot = serde_json::from_str(json)?;
        tracing::info!(files = snapshot.files.len(), "restoring file index");
        self.restore(snapshot);
        Ok(())
    }
}
