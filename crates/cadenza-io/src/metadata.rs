//! JSON-file metadata store.

use crate::{Error, Result};
use cadenza_index::{FileId, FileMetadata};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Keeps every file record in one JSON array on disk.
///
/// Each change rewrites the file through a temporary sibling and a rename,
/// so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct JsonMetadataStore {
    path: PathBuf,
    records: Mutex<BTreeMap<FileId, FileMetadata>>,
}

impl JsonMetadataStore {
    /// Opens the store at `path`, starting empty if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|source| Error::io(&path, source))?;
            let files: Vec<FileMetadata> =
                serde_json::from_str(&text).map_err(|source| Error::json(&path, source))?;
            files.into_iter().map(|m| (m.id.clone(), m)).collect()
        } else {
            BTreeMap::new()
        };
        tracing::info!(path = %path.display(), files = records.len(), "metadata store opened");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// File backing the store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record, ordered by id.
    pub fn records(&self) -> Vec<FileMetadata> {
        self.records.lock().values().cloned().collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Inserts or replaces a record and saves.
    pub fn put(&self, meta: FileMetadata) -> Result<()> {
        let mut records = self.records.lock();
        records.insert(meta.id.clone(), meta);
        self.save(&records)
    }

    /// Removes a record and saves. Returns the removed record.
    pub fn take(&self, id: &FileId) -> Result<Option<FileMetadata>> {
        let mut records = self.records.lock();
        let removed = records.remove(id);
        if removed.is_some() {
            self.save(&records)?;
        }
        Ok(removed)
    }

    fn save(&self, records: &BTreeMap<FileId, FileMetadata>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| Error::io(parent, source))?;
        }

        let files: Vec<&FileMetadata> = records.values().collect();
        let json = serde_json::to_string_pretty(&files).map_err(|source| Error::json(&self.path, source))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| Error::io(&tmp, source))?;
        std::fs::rename(&tmp, &self.path).map_err(|source| Error::io(&self.path, source))?;
        Ok(())
    }
}
