//! Filesystem implementations of the engine's storage collaborators.

use crate::{Error, JsonMetadataStore, Result, WavSpec, write_wav};
use cadenza_engine::{MetadataStore, ProcessedStore, StoreError};
use cadenza_index::{BlobStore, FileId, FileMetadata};
use std::path::{Path, PathBuf};

/// Writes processed output as `<dir>/<name>.wav`.
#[derive(Debug, Clone)]
pub struct WavStore {
    dir: PathBuf,
    bits_per_sample: u16,
}

impl WavStore {
    /// Stores 16-bit PCM files under `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            bits_per_sample: 16,
        }
    }

    /// Sets the output bit depth (16, 24, or 32 for float).
    pub fn with_bits_per_sample(mut self, bits: u16) -> Self {
        self.bits_per_sample = bits;
        self
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.wav", name))
    }

    fn write(&self, name: &str, samples: &[f32], sample_rate: u32) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|source| Error::io(&self.dir, source))?;
        let path = self.path_for(name);
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: self.bits_per_sample,
        };
        write_wav(&path, samples, spec)?;
        tracing::debug!(path = %path.display(), samples = samples.len(), "processed audio written");
        Ok(path)
    }
}

impl ProcessedStore for WavStore {
    fn store(&self, name: &str, samples: &[f32], sample_rate: u32) -> std::result::Result<String, StoreError> {
        let path = self.write(name, samples, sample_rate)?;
        Ok(path.to_string_lossy().into_owned())
    }

    fn remove(&self, location: &str) -> std::result::Result<(), StoreError> {
        match std::fs::remove_file(location) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Error::io(location, e).into()),
            _ => Ok(()),
        }
    }
}

/// Reads indexed files straight from disk.
///
/// Relative paths in [`FileMetadata::path`] resolve against the root, if one
/// is set, and against the working directory otherwise.
#[derive(Debug, Clone, Default)]
pub struct FsBlobStore {
    root: Option<PathBuf>,
}

impl FsBlobStore {
    /// Resolves paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Location `meta` is read from.
    pub fn resolve(&self, meta: &FileMetadata) -> PathBuf {
        let path = Path::new(&meta.path);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl BlobStore for FsBlobStore {
    fn fetch(&self, meta: &FileMetadata) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.resolve(meta))
    }
}

impl MetadataStore for JsonMetadataStore {
    fn load_all(&self) -> std::result::Result<Vec<FileMetadata>, StoreError> {
        Ok(self.records())
    }

    fn upsert(&self, meta: &FileMetadata) -> std::result::Result<(), StoreError> {
        Ok(self.put(meta.clone())?)
    }

    fn delete(&self, id: &FileId) -> std::result::Result<bool, StoreError> {
        Ok(self.take(id)?.is_some())
    }
}
