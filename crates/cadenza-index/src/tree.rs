//! Arena-backed AVL tree keyed by [`FileId`].
//!
//! Nodes live contiguously in a `Vec`; children are slot indices. Removing
//! a node swaps the last slot into the hole and redirects the single link
//! that pointed at it, so the arena never has gaps.
//!
//! After every insert or remove, each node satisfies
//! `|height(left) - height(right)| <= 1`.

use crate::metadata::{AccessStats, FileId, FileMetadata, FileProcessingEntry, now_ms};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

#[derive(Debug)]
struct Node {
    meta: FileMetadata,
    height: u32,
    left: Option<usize>,
    right: Option<usize>,
    revision: u64,
    access_count: AtomicU64,
    last_accessed_ms: AtomicU64,
}

impl Node {
    fn leaf(meta: FileMetadata, stats: AccessStats, revision: u64) -> Self {
        Self {
            meta,
            revision,
            height: 1,
            left: None,
            right: None,
            access_count: AtomicU64::new(stats.access_count),
            last_accessed_ms: AtomicU64::new(stats.last_accessed_ms),
        }
    }

    fn stats(&self) -> AccessStats {
        AccessStats {
            access_count: self.access_count.load(AtomicOrdering::Relaxed),
            last_accessed_ms: self.last_accessed_ms.load(AtomicOrdering::Relaxed),
        }
    }
}

/// One record in an [`IndexSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// File metadata.
    #[serde(flatten)]
    pub meta: FileMetadata,
    /// Lookup counters at snapshot time.
    #[serde(default)]
    pub access: AccessStats,
}

/// Serializable image of a [`FileIndex`], in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Every file, sorted by id.
    pub files: Vec<SnapshotEntry>,
}

/// Balanced ordered map from [`FileId`] to [`FileMetadata`].
///
/// `find` takes `&self` and still bumps the per-file access counters, so
/// lookups can run in parallel under a shared lock.
#[derive(Debug, Default)]
pub struct FileIndex {
    nodes: Vec<Node>,
    root: Option<usize>,
    total_size_bytes: u64,
    last_revision: u64,
}

impl FileIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a perfectly balanced index from `files`. Later duplicates
    /// replace earlier ones.
    pub fn from_files(files: impl IntoIterator<Item = FileMetadata>) -> Self {
        Self::build(
            files
                .into_iter()
                .map(|meta| (meta, AccessStats::default()))
                .collect(),
        )
    }

    /// Rebuilds an index from a snapshot, keeping access counters.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Self {
        Self::build(
            snapshot
                .files
                .into_iter()
                .map(|e| (e.meta, e.access))
                .collect(),
        )
    }

    fn build(mut entries: Vec<(FileMetadata, AccessStats)>) -> Self {
        // stable sort keeps insertion order among equal ids; keep the last
        entries.sort_by(|a, b| a.0.id.cmp(&b.0.id));
        let mut deduped: Vec<(FileMetadata, AccessStats)> = Vec::with_capacity(entries.len());
        for entry in entries {
            match deduped.last_mut() {
                Some(last) if last.0.id == entry.0.id => *last = entry,
                _ => deduped.push(entry),
            }
        }

        let mut index = Self::new();
        index.total_size_bytes = deduped.iter().map(|(m, _)| m.size_bytes).sum();
        index.nodes.reserve(deduped.len());
        let mut slots: Vec<Option<(FileMetadata, AccessStats)>> =
            deduped.into_iter().map(Some).collect();
        let count = slots.len();
        index.root = index.build_range(&mut slots, 0, count);
        index
    }

    fn build_range(
        &mut self,
        entries: &mut [Option<(FileMetadata, AccessStats)>],
        lo: usize,
        hi: usize,
    ) -> Option<usize> {
        if lo >= hi {
            return None;
        }
        let mid = lo + (hi - lo) / 2;
        let left = self.build_range(entries, lo, mid);
        let right = self.build_range(entries, mid + 1, hi);
        let (meta, stats) = entries[mid].take()?;
        let idx = self.nodes.len();
        let revision = self.next_revision();
        self.nodes.push(Node::leaf(meta, stats, revision));
        self.nodes[idx].left = left;
        self.nodes[idx].right = right;
        self.update_height(idx);
        Some(idx)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the index holds no files.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tree; 0 when empty.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Sum of `size_bytes` over all files.
    pub fn total_size_bytes(&self) -> u64 {
        self.total_size_bytes
    }

    fn next_revision(&mut self) -> u64 {
        self.last_revision += 1;
        self.last_revision
    }

    /// Inserts or replaces the record keyed by `meta.id`. Returns the
    /// replaced record. Replacing keeps the file's access counters but
    /// gives the record a new [`revision`](Self::revision).
    pub fn insert(&mut self, meta: FileMetadata) -> Option<FileMetadata> {
        let size = meta.size_bytes;
        let revision = self.next_revision();
        let mut replaced = None;
        let root = self.insert_at(self.root, meta, revision, &mut replaced);
        self.root = Some(root);
        self.total_size_bytes += size;
        if let Some(old) = &replaced {
            self.total_size_bytes -= old.size_bytes;
        }
        replaced
    }

    fn insert_at(
        &mut self,
        slot: Option<usize>,
        meta: FileMetadata,
        revision: u64,
        replaced: &mut Option<FileMetadata>,
    ) -> usize {
        let Some(idx) = slot else {
            self.nodes
                .push(Node::leaf(meta, AccessStats::default(), revision));
            return self.nodes.len() - 1;
        };
        match meta.id.cmp(&self.nodes[idx].meta.id) {
            Ordering::Less => {
                let child = self.insert_at(self.nodes[idx].left, meta, revision, replaced);
                self.nodes[idx].left = Some(child);
            }
            Ordering::Greater => {
                let child = self.insert_at(self.nodes[idx].right, meta, revision, replaced);
                self.nodes[idx].right = Some(child);
            }
            Ordering::Equal => {
                *replaced = Some(std::mem::replace(&mut self.nodes[idx].meta, meta));
                self.nodes[idx].revision = revision;
                return idx;
            }
        }
        self.rebalance(idx)
    }

    /// Removes the record for `id` and returns it.
    pub fn remove(&mut self, id: &FileId) -> Option<FileMetadata> {
        let mut removed = None;
        self.root = self.remove_at(self.root, id, &mut removed);
        let idx = removed?;
        let node = self.release(idx);
        self.total_size_bytes -= node.meta.size_bytes;
        Some(node.meta)
    }

    fn remove_at(
        &mut self,
        slot: Option<usize>,
        id: &FileId,
        removed: &mut Option<usize>,
    ) -> Option<usize> {
        let idx = slot?;
        match id.cmp(&self.nodes[idx].meta.id) {
            Ordering::Less => {
                let child = self.remove_at(self.nodes[idx].left, id, removed);
                self.nodes[idx].left = child;
            }
            Ordering::Greater => {
                let child = self.remove_at(self.nodes[idx].right, id, removed);
                self.nodes[idx].right = child;
            }
            Ordering::Equal => {
                *removed = Some(idx);
                let node = &self.nodes[idx];
                return match (node.left, node.right) {
                    (None, None) => None,
                    (Some(child), None) | (None, Some(child)) => Some(child),
                    (Some(left), Some(right)) => {
                        let (rest, successor) = self.detach_min(right);
                        self.nodes[successor].left = Some(left);
                        self.nodes[successor].right = rest;
                        Some(self.rebalance(successor))
                    }
                };
            }
        }
        Some(self.rebalance(idx))
    }

    /// Unlinks the leftmost node under `idx`. Returns the new subtree root
    /// and the detached node's slot.
    fn detach_min(&mut self, idx: usize) -> (Option<usize>, usize) {
        match self.nodes[idx].left {
            None => (self.nodes[idx].right, idx),
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.nodes[idx].left = rest;
                (Some(self.rebalance(idx)), min)
            }
        }
    }

    /// Frees slot `idx`, which must already be unlinked from the tree.
    fn release(&mut self, idx: usize) -> Node {
        let last = self.nodes.len() - 1;
        if idx != last {
            self.redirect_link(last, idx);
        }
        self.nodes.swap_remove(idx)
    }

    /// Points whichever link references slot `from` at slot `to`.
    fn redirect_link(&mut self, from: usize, to: usize) {
        if self.root == Some(from) {
            self.root = Some(to);
            return;
        }
        let mut cursor = self.root;
        while let Some(at) = cursor {
            let go_left = self.nodes[from].meta.id < self.nodes[at].meta.id;
            let next = if go_left {
                self.nodes[at].left
            } else {
                self.nodes[at].right
            };
            if next == Some(from) {
                if go_left {
                    self.nodes[at].left = Some(to);
                } else {
                    self.nodes[at].right = Some(to);
                }
                return;
            }
            cursor = next;
        }
    }

    fn height_of(&self, slot: Option<usize>) -> u32 {
        slot.map_or(0, |idx| self.nodes[idx].height)
    }

    fn update_height(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[idx].height = height;
    }

    fn balance_factor(&self, idx: usize) -> i64 {
        let node = &self.nodes[idx];
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let Some(pivot) = self.nodes[idx].left else {
            return idx;
        };
        self.nodes[idx].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(idx);
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let Some(pivot) = self.nodes[idx].right else {
            return idx;
        };
        self.nodes[idx].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(idx);
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    /// Restores the AVL condition at `idx` and returns the subtree root.
    fn rebalance(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let balance = self.balance_factor(idx);
        if balance > 1 {
            if let Some(left) = self.nodes[idx].left {
                if self.balance_factor(left) < 0 {
                    self.nodes[idx].left = Some(self.rotate_left(left));
                }
            }
            return self.rotate_right(idx);
        }
        if balance < -1 {
            if let Some(right) = self.nodes[idx].right {
                if self.balance_factor(right) > 0 {
                    self.nodes[idx].right = Some(self.rotate_right(right));
                }
            }
            return self.rotate_left(idx);
        }
        idx
    }

    fn locate(&self, id: &FileId) -> Option<usize> {
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            cursor = match id.cmp(&self.nodes[idx].meta.id) {
                Ordering::Less => self.nodes[idx].left,
                Ordering::Greater => self.nodes[idx].right,
                Ordering::Equal => return Some(idx),
            };
        }
        None
    }

    /// Looks up `id` and records the access.
    pub fn find(&self, id: &FileId) -> Option<&FileMetadata> {
        let node = &self.nodes[self.locate(id)?];
        node.access_count.fetch_add(1, AtomicOrdering::Relaxed);
        node.last_accessed_ms.store(now_ms(), AtomicOrdering::Relaxed);
        Some(&node.meta)
    }

    /// Looks up `id` without touching the access counters.
    pub fn get(&self, id: &FileId) -> Option<&FileMetadata> {
        self.locate(id).map(|idx| &self.nodes[idx].meta)
    }

    /// Returns `true` if `id` is indexed.
    pub fn contains(&self, id: &FileId) -> bool {
        self.locate(id).is_some()
    }

    /// Access counters for `id`.
    pub fn access_stats(&self, id: &FileId) -> Option<AccessStats> {
        self.locate(id).map(|idx| self.nodes[idx].stats())
    }

    /// Appends a processing entry to the record for `id` and returns the
    /// updated record.
    ///
    /// The revision is left alone: history does not change the audio, so
    /// cached decodes stay valid.
    pub fn record_processing(
        &mut self,
        id: &FileId,
        entry: FileProcessingEntry,
        cap: usize,
    ) -> Option<FileMetadata> {
        let idx = self.locate(id)?;
        let meta = &mut self.nodes[idx].meta;
        meta.record_processing(entry, cap);
        Some(meta.clone())
    }

    /// Shifts every revision past `floor`, so records of a rebuilt index
    /// never reuse a revision handed out by the index it replaces.
    pub(crate) fn rebase_revisions(&mut self, floor: u64) {
        for node in &mut self.nodes {
            node.revision += floor;
        }
        self.last_revision += floor;
    }

    pub(crate) fn last_revision(&self) -> u64 {
        self.last_revision
    }

    /// Revision of the record for `id`. Every insert, including a
    /// replacement, stamps the record with a value no earlier record in
    /// this index has carried.
    pub fn revision(&self, id: &FileId) -> Option<u64> {
        self.locate(id).map(|idx| self.nodes[idx].revision)
    }

    /// Files in ascending id order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter {
            index: self,
            stack: Vec::with_capacity(self.height() as usize),
        };
        iter.push_left(self.root);
        iter
    }

    /// Clones every record in ascending id order.
    pub fn in_order(&self) -> Vec<FileMetadata> {
        self.iter().cloned().collect()
    }

    /// Files whose filename contains `query` (case-insensitive) and, when
    /// `tags` is non-empty, carry at least one of them. At most `limit`
    /// results, in id order.
    pub fn search(&self, query: &str, tags: &[String], limit: usize) -> Vec<FileMetadata> {
        let needle = query.to_lowercase();
        self.iter()
            .filter(|m| needle.is_empty() || m.filename.to_lowercase().contains(&needle))
            .filter(|m| tags.is_empty() || m.has_any_tag(tags))
            .take(limit)
            .cloned()
            .collect()
    }

    /// The `limit` most frequently found files, busiest first.
    pub fn popular(&self, limit: usize) -> Vec<(FileMetadata, AccessStats)> {
        let mut entries: Vec<(&Node, AccessStats)> =
            self.nodes.iter().map(|n| (n, n.stats())).collect();
        entries.sort_by(|a, b| {
            b.1.access_count
                .cmp(&a.1.access_count)
                .then_with(|| a.0.meta.id.cmp(&b.0.meta.id))
        });
        entries
            .into_iter()
            .take(limit)
            .map(|(n, stats)| (n.meta.clone(), stats))
            .collect()
    }

    /// The `limit` most recently uploaded files, newest first.
    pub fn recent(&self, limit: usize) -> Vec<FileMetadata> {
        let mut files: Vec<&FileMetadata> = self.nodes.iter().map(|n| &n.meta).collect();
        files.sort_by(|a, b| {
            b.uploaded_at_ms
                .cmp(&a.uploaded_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });
        files.into_iter().take(limit).cloned().collect()
    }

    /// Captures every record and its counters in id order.
    pub fn snapshot(&self) -> IndexSnapshot {
        let mut files = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut cursor = self.root;
        while cursor.is_some() || !stack.is_empty() {
            while let Some(idx) = cursor {
                stack.push(idx);
                cursor = self.nodes[idx].left;
            }
            if let Some(idx) = stack.pop() {
                let node = &self.nodes[idx];
                files.push(SnapshotEntry {
                    meta: node.meta.clone(),
                    access: node.stats(),
                });
                cursor = node.right;
            }
        }
        IndexSnapshot { files }
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.total_size_bytes = 0;
    }

    /// Checks ordering, cached heights and the AVL condition at every node.
    /// Returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = 0;
        self.check_node(self.root, None, None, &mut seen)?;
        if seen != self.nodes.len() {
            return Err(format!("{} nodes reachable, {} stored", seen, self.nodes.len()));
        }
        Ok(())
    }

    fn check_node(
        &self,
        slot: Option<usize>,
        lower: Option<&FileId>,
        upper: Option<&FileId>,
        seen: &mut usize,
    ) -> Result<u32, String> {
        let Some(idx) = slot else {
            return Ok(0);
        };
        *seen += 1;
        let node = &self.nodes[idx];
        let id = &node.meta.id;
        if lower.is_some_and(|lo| id <= lo) || upper.is_some_and(|hi| id >= hi) {
            return Err(format!("'{}' is out of order", id));
        }
        let lh = self.check_node(node.left, lower, Some(id), seen)?;
        let rh = self.check_node(node.right, Some(id), upper, seen)?;
        if lh.abs_diff(rh) > 1 {
            return Err(format!("'{}' unbalanced: left {} right {}", id, lh, rh));
        }
        let height = 1 + lh.max(rh);
        if height != node.height {
            return Err(format!("'{}' caches height {}, actual {}", id, node.height, height));
        }
        Ok(height)
    }
}

/// In-order iterator over a [`FileIndex`].
pub struct Iter<'a> {
    index: &'a FileIndex,
    stack: Vec<usize>,
}

impl Iter<'_> {
    fn push_left(&mut self, mut slot: Option<usize>) {
        while let Some(idx) = slot {
            self.stack.push(idx);
            slot = self.index.nodes[idx].left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a FileMetadata;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let index = self.index;
        self.push_left(index.nodes[idx].right);
        Some(&index.nodes[idx].meta)
    }
}
