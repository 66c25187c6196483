//! Least-recently-used cache of decoded audio.

use crate::FileId;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Decoded samples of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples in [-1, 1].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source before mixdown.
    pub channels: u16,
}

impl DecodedAudio {
    /// Length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Bounded recency cache. Every lookup, hit or miss, counts toward the hit
/// rate, and hits move the entry to the most-recent position.
pub struct RecencyCache {
    entries: LruCache<FileId, Arc<DecodedAudio>>,
    hits: u64,
    misses: u64,
}

impl RecencyCache {
    /// Creates a cache holding up to `capacity` files (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached audio for `id` and marks it most recent.
    pub fn get(&mut self, id: &FileId) -> Option<Arc<DecodedAudio>> {
        match self.entries.get(id) {
            Some(audio) => {
                self.hits += 1;
                Some(Arc::clone(audio))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Caches `audio` as most recent. Returns the id evicted to make room,
    /// if any.
    pub fn insert(&mut self, id: FileId, audio: Arc<DecodedAudio>) -> Option<FileId> {
        match self.entries.push(id.clone(), audio) {
            Some((old, _)) if old != id => Some(old),
            _ => None,
        }
    }

    /// Drops `id` from the cache.
    pub fn remove(&mut self, id: &FileId) -> Option<Arc<DecodedAudio>> {
        self.entries.pop(id)
    }

    /// Returns `true` if `id` is cached. Does not change recency.
    pub fn contains(&self, id: &FileId) -> bool {
        self.entries.contains(id)
    }

    /// Cached ids, most recent first.
    pub fn keys(&self) -> Vec<FileId> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached files.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Fraction of lookups that hit, 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Empties the cache. Hit counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for RecencyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecencyCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(n: usize) -> Arc<DecodedAudio> {
        Arc::new(DecodedAudio {
            samples: vec![0.0; n],
            sample_rate: 100,
            channels: 1,
        })
    }

    #[test]
    fn test_evicts_least_recent() {
        let mut cache = RecencyCache::new(2);
        assert_eq!(cache.insert("A".into(), audio(1)), None);
        assert_eq!(cache.insert("B".into(), audio(1)), None);
        assert_eq!(cache.insert("C".into(), audio(1)), Some(FileId::from("A")));
        assert!(!cache.contains(&"A".into()));
        assert_eq!(cache.keys(), vec![FileId::from("C"), FileId::from("B")]);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = RecencyCache::new(2);
        cache.insert("A".into(), audio(1));
        cache.insert("B".into(), audio(1));
        assert!(cache.get(&"A".into()).is_some());
        assert_eq!(cache.insert("C".into(), audio(1)), Some(FileId::from("B")));
        assert!(cache.contains(&"A".into()));
    }

    #[test]
    fn test_reinsert_is_not_eviction() {
        let mut cache = RecencyCache::new(1);
        cache.insert("A".into(), audio(1));
        assert_eq!(cache.insert("A".into(), audio(2)), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"A".into()).unwrap().samples.len(), 2);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = RecencyCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_hit_rate() {
        let mut cache = RecencyCache::new(4);
        cache.insert("A".into(), audio(1));
        cache.get(&"A".into());
        cache.get(&"B".into());
        assert!((cache.hit_rate() - 0.5).abs() < 1e-12);
        assert!((audio(50).duration_seconds() - 0.5).abs() < 1e-12);
    }
}
