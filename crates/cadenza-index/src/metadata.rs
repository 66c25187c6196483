//! File identity and descriptive metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key of an indexed file. Ordering is plain string ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the index knows about one stored audio file.
///
/// Missing fields in serialized records fall back to [`Default`], which
/// assumes 44.1 kHz mono 16-bit audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMetadata {
    /// Index key.
    pub id: FileId,
    /// Display name, usually the last path component.
    pub filename: String,
    /// Location handed to the blob store.
    pub path: String,
    /// Size of the stored file.
    pub size_bytes: u64,
    /// Length in seconds.
    pub duration_seconds: f64,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Bits per sample.
    pub bit_depth: u16,
    /// Lowercase container hint passed to the decoder ("wav", "flac").
    pub format: String,
    /// Free-form labels.
    pub tags: Vec<String>,
    /// Registration time, milliseconds since the Unix epoch.
    pub uploaded_at_ms: u64,
    /// Effects run over audio loaded from this file, oldest first.
    pub processing_history: Vec<FileProcessingEntry>,
}

impl Default for FileMetadata {
    fn default() -> Self {
        Self {
            id: FileId::default(),
            filename: String::new(),
            path: String::new(),
            size_bytes: 0,
            duration_seconds: 0.0,
            sample_rate: 44100,
            channels: 1,
            bit_depth: 16,
            format: String::new(),
            tags: Vec::new(),
            uploaded_at_ms: 0,
            processing_history: Vec::new(),
        }
    }
}

impl FileMetadata {
    /// Metadata for `path`, with filename and format taken from the path and
    /// the upload time set to now.
    pub fn new(id: impl Into<FileId>, path: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or_default()
            .to_string();
        let format = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            id: id.into(),
            filename,
            path,
            format,
            uploaded_at_ms: now_ms(),
            ..Self::default()
        }
    }

    /// Sets the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Appends `entry`, dropping the oldest entries beyond `cap`.
    pub fn record_processing(&mut self, entry: FileProcessingEntry, cap: usize) {
        self.processing_history.push(entry);
        let excess = self.processing_history.len().saturating_sub(cap.max(1));
        self.processing_history.drain(..excess);
    }

    /// Returns `true` if any of `tags` is attached to this file.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.tags.contains(t))
    }
}

/// One effect application recorded against the file its samples came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileProcessingEntry {
    /// Time of the application, ms since the Unix epoch.
    pub timestamp_ms: u64,
    /// Effect name.
    pub effect: String,
    /// Parameters the effect ran with.
    pub parameters: serde_json::Value,
    /// Raw id of the session that ran it.
    pub session: u64,
    /// Samples run through the effect.
    pub samples_processed: usize,
    /// Where the processed output was persisted, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Lookup counters kept per indexed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessStats {
    /// Number of successful `find` calls.
    pub access_count: u64,
    /// Time of the latest `find`, ms since the Unix epoch; 0 if never.
    pub last_accessed_ms: u64,
}

/// Wall clock in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_name_and_format() {
        let meta = FileMetadata::new("a1", "uploads/2024/Take_03.WAV");
        assert_eq!(meta.filename, "Take_03.WAV");
        assert_eq!(meta.format, "wav");
        assert!(meta.uploaded_at_ms > 0);
    }

    #[test]
    fn test_missing_fields_default() {
        let meta: FileMetadata = serde_json::from_str(r#"{"id":"x","path":"x.wav"}"#).unwrap();
        assert_eq!(meta.id, FileId::from("x"));
        assert_eq!(meta.sample_rate, 44100);
        assert_eq!(meta.channels, 1);
        assert!(meta.processing_history.is_empty());
    }

    fn entry(timestamp_ms: u64) -> FileProcessingEntry {
        FileProcessingEntry {
            timestamp_ms,
            effect: "normalize".to_string(),
            parameters: serde_json::json!({ "target_level": -3.0 }),
            session: 1,
            samples_processed: 10,
            output: None,
        }
    }

    #[test]
    fn test_processing_history_keeps_newest() {
        let mut meta = FileMetadata::new("h", "h.wav");
        for t in 0..5 {
            meta.record_processing(entry(t), 3);
        }
        let stamps: Vec<u64> = meta.processing_history.iter().map(|e| e.timestamp_ms).collect();
        assert_eq!(stamps, vec![2, 3, 4]);

        let json = serde_json::to_string(&meta).unwrap();
        let back: FileMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.processing_history, meta.processing_history);
    }

    #[test]
    fn test_tag_match() {
        let meta = FileMetadata::new("t", "t.wav").with_tags(["drums", "loop"]);
        assert!(meta.has_any_tag(&["loop".to_string(), "vocal".to_string()]));
        assert!(!meta.has_any_tag(&["vocal".to_string()]));
    }
}
