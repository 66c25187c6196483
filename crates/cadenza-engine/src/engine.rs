//! The engine facade the transport layer talks to.

use crate::events::{BufferLevel, EventBus, StatusEvent};
use crate::registry::{SessionHandle, SessionRegistry};
use crate::session::{
    ApplySummary, ChainSummary, ProcessingRecord, Session, SessionId, SessionInfo, SessionOptions,
};
use crate::store::{MetadataStore, ProcessedStore};
use crate::EngineError;
use cadenza_analysis::{AudioAnalysis, FeatureKind, FeatureSet};
use cadenza_config::{BUFFER_CAPACITY_RANGE, EngineConfig, SAMPLE_RATE_RANGE};
use cadenza_core::{BufferStatus, SampleBuffer};
use cadenza_effects::{EffectError, EffectSpec, validate_chain};
use cadenza_index::{
    BlobStore, DecodedAudio, Decoder, FileId, FileMetadata, FileProcessingEntry, IndexError,
    IndexStats, SharedFileIndex, now_ms,
};
use crossbeam_channel::Receiver;
use parking_lot::MutexGuard;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Aggregate counters across sessions and the file index.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    /// Live sessions.
    pub total_sessions: usize,
    /// Unread samples summed over every session.
    pub total_samples_available: usize,
    /// Mean buffer utilization, 0 with no sessions.
    pub average_utilization: f32,
    /// File index and cache counters.
    pub index: IndexStats,
}

/// Session-scoped audio engine.
///
/// Sessions run independently: each has its own mutex, and the registry
/// lock is only held to look a session up. The file index is shared by
/// all sessions.
///
/// # Example
///
/// ```rust
/// use cadenza_config::EngineConfig;
/// use cadenza_effects::{EffectSpec, NormalizeParams};
/// use cadenza_engine::Engine;
///
/// let engine = Engine::new(EngineConfig::default()).unwrap();
/// let id = engine.create_session();
/// engine.write_samples(id, &[0.1, -0.05, 0.02]).unwrap();
///
/// let spec = EffectSpec::from(NormalizeParams { target_level: -3.0 });
/// let summary = engine.apply_effect(id, &spec).unwrap();
/// assert_eq!(summary.samples_processed, 3);
/// assert_eq!(engine.get_history(id).unwrap().len(), 1);
/// ```
pub struct Engine {
    config: EngineConfig,
    registry: SessionRegistry,
    index: SharedFileIndex,
    events: EventBus,
    processed_store: Option<Arc<dyn ProcessedStore>>,
    metadata_store: Option<Arc<dyn MetadataStore>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    decoder: Option<Arc<dyn Decoder>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("sessions", &self.registry.len())
            .field("files", &self.index.len())
            .field("processed_store", &self.processed_store.is_some())
            .field("metadata_store", &self.metadata_store.is_some())
            .field("blob_store", &self.blob_store.is_some())
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

impl Engine {
    /// Creates an engine with no collaborators attached.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        tracing::info!(
            sample_rate = config.sample_rate,
            buffer_capacity = config.effective_buffer_capacity(),
            cache_capacity = config.cache_capacity,
            "engine started"
        );
        Ok(Self {
            index: SharedFileIndex::new(config.cache_capacity),
            events: EventBus::new(config.event_queue_capacity),
            registry: SessionRegistry::new(),
            config,
            processed_store: None,
            metadata_store: None,
            blob_store: None,
            decoder: None,
        })
    }

    /// Attaches the store processed output is persisted to.
    pub fn with_processed_store(mut self, store: Arc<dyn ProcessedStore>) -> Self {
        self.processed_store = Some(store);
        self
    }

    /// Attaches the durable metadata store the index syncs with.
    pub fn with_metadata_store(mut self, store: Arc<dyn MetadataStore>) -> Self {
        self.metadata_store = Some(store);
        self
    }

    /// Attaches the blob store raw file bytes are fetched from.
    pub fn with_blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    /// Attaches the decoder used on a cache miss.
    pub fn with_decoder(mut self, decoder: Arc<dyn Decoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Sessions ---

    /// Creates a session with the configured sample rate and capacity.
    pub fn create_session(&self) -> SessionId {
        self.spawn(
            None,
            self.config.sample_rate,
            self.config.effective_buffer_capacity(),
        )
    }

    /// Creates a session with per-session overrides.
    ///
    /// Without an explicit capacity the buffer holds the configured
    /// capacity, or one second at the session's sample rate if none is
    /// configured.
    pub fn create_session_with(&self, options: SessionOptions) -> Result<SessionId, EngineError> {
        let sample_rate = options.sample_rate.unwrap_or(self.config.sample_rate);
        if !SAMPLE_RATE_RANGE.contains(&sample_rate) {
            return Err(EngineError::invalid_session(format!(
                "sample rate {} outside {}..={}",
                sample_rate,
                SAMPLE_RATE_RANGE.start(),
                SAMPLE_RATE_RANGE.end()
            )));
        }

        let capacity = options
            .capacity
            .or(self.config.buffer_capacity)
            .unwrap_or(sample_rate as usize);
        if !BUFFER_CAPACITY_RANGE.contains(&capacity) {
            return Err(EngineError::invalid_session(format!(
                "capacity {} outside {}..={}",
                capacity,
                BUFFER_CAPACITY_RANGE.start(),
                BUFFER_CAPACITY_RANGE.end()
            )));
        }

        Ok(self.spawn(options.name, sample_rate, capacity))
    }

    fn spawn(&self, name: Option<String>, sample_rate: u32, capacity: usize) -> SessionId {
        let id = self.registry.allocate_id();
        let name = name.unwrap_or_else(|| format!("session-{}", id));
        let buffer = SampleBuffer::new(capacity, sample_rate);
        self.registry
            .insert(Session::new(id, name, buffer, self.config.history_cap));

        tracing::info!(session = %id, sample_rate, capacity, "session created");
        self.events.emit(StatusEvent::SessionCreated { session: id });
        id
    }

    /// Destroys a session, releasing its buffer.
    pub fn destroy_session(&self, id: SessionId) -> Result<(), EngineError> {
        self.registry
            .remove(id)
            .ok_or(EngineError::SessionNotFound(id))?;
        tracing::info!(session = %id, "session destroyed");
        self.events.emit(StatusEvent::SessionDestroyed { session: id });
        Ok(())
    }

    fn session(&self, id: SessionId) -> Result<SessionHandle, EngineError> {
        self.registry.get(id).ok_or(EngineError::SessionNotFound(id))
    }

    /// Listing of every live session, ordered by id.
    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        self.registry
            .all()
            .iter()
            .map(|handle| handle.lock().info())
            .collect()
    }

    /// Counters across every session and the index.
    pub fn stats(&self) -> EngineStats {
        let sessions = self.list_sessions();
        let total_samples_available = sessions.iter().map(|s| s.available).sum();
        let average_utilization = if sessions.is_empty() {
            0.0
        } else {
            sessions.iter().map(|s| s.utilization).sum::<f32>() / sessions.len() as f32
        };
        EngineStats {
            total_sessions: sessions.len(),
            total_samples_available,
            average_utilization,
            index: self.index.stats(),
        }
    }

    // --- Buffers ---

    /// Pushes samples into a session's buffer.
    ///
    /// Returns how many fit; the rest are rejected, never overwritten.
    pub fn write_samples(&self, id: SessionId, samples: &[f32]) -> Result<usize, EngineError> {
        let handle = self.session(id)?;
        let (written, status) = {
            let mut session = handle.lock();
            let written = session.buffer_mut().write(samples);
            (written, session.status())
        };
        if written < samples.len() {
            tracing::warn!(
                session = %id,
                requested = samples.len(),
                written,
                "buffer full, write truncated"
            );
        }
        self.buffer_changed(id, &status);
        Ok(written)
    }

    /// Pops up to `max_count` samples from a session's buffer.
    pub fn read_samples(&self, id: SessionId, max_count: usize) -> Result<Vec<f32>, EngineError> {
        let handle = self.session(id)?;
        let (samples, status) = {
            let mut session = handle.lock();
            let samples = session.buffer_mut().read(max_count);
            if session.buffer().is_empty() {
                session.set_source(None);
            }
            (samples, session.status())
        };
        self.buffer_changed(id, &status);
        Ok(samples)
    }

    /// Buffer counters for a session.
    pub fn buffer_status(&self, id: SessionId) -> Result<BufferStatus, EngineError> {
        Ok(self.session(id)?.lock().status())
    }

    /// Empties one session's buffer.
    pub fn clear_buffer(&self, id: SessionId) -> Result<(), EngineError> {
        let handle = self.session(id)?;
        let status = {
            let mut session = handle.lock();
            session.buffer_mut().clear();
            session.set_source(None);
            session.status()
        };
        self.buffer_changed(id, &status);
        Ok(())
    }

    /// Empties every session's buffer. Returns how many were cleared.
    pub fn clear_all_buffers(&self) -> usize {
        let handles = self.registry.all();
        for handle in &handles {
            let (id, status) = {
                let mut session = handle.lock();
                session.buffer_mut().clear();
                session.set_source(None);
                (session.id(), session.status())
            };
            self.buffer_changed(id, &status);
        }
        tracing::info!(sessions = handles.len(), "all buffers cleared");
        handles.len()
    }

    fn buffer_changed(&self, id: SessionId, status: &BufferStatus) {
        self.events.emit(StatusEvent::BufferChanged {
            session: id,
            level: BufferLevel {
                available: status.available,
                capacity: status.capacity,
                utilization: status.utilization,
            },
        });
    }

    // --- Effects ---

    fn persist_target(&self) -> Option<&dyn ProcessedStore> {
        if self.config.persist_processed {
            self.processed_store.as_deref()
        } else {
            None
        }
    }

    /// Runs one effect over every available sample of a session.
    ///
    /// The spec is validated against the session's sample rate first; a
    /// rejected spec, or a failed persist, leaves the buffer untouched.
    pub fn apply_effect(&self, id: SessionId, spec: &EffectSpec) -> Result<ApplySummary, EngineError> {
        let handle = self.session(id)?;
        let mut session = handle.lock();
        spec.validate(session.buffer().sample_rate() as f32)?;

        let mut summaries = session.process(std::slice::from_ref(spec), self.persist_target())?;
        let status = session.status();
        let source = session.source().cloned();
        drop(session);

        let summary = summaries.remove(0);
        tracing::debug!(
            session = %id,
            effect = %summary.effect,
            samples = summary.samples_processed,
            elapsed_us = summary.duration.as_micros() as u64,
            "effect applied"
        );
        let specs = std::slice::from_ref(spec);
        self.applied(id, specs, std::slice::from_ref(&summary), &status, source.as_ref());
        Ok(summary)
    }

    /// Validates `specs` as a chain, then runs them in order.
    pub fn apply_effects(&self, id: SessionId, specs: &[EffectSpec]) -> Result<ChainSummary, EngineError> {
        let handle = self.session(id)?;
        let session = handle.lock();
        self.run_chain(id, session, specs)
    }

    /// Validates and stores a session's chain for [`apply_chain`](Self::apply_chain).
    pub fn set_chain(&self, id: SessionId, chain: Vec<EffectSpec>) -> Result<(), EngineError> {
        let handle = self.session(id)?;
        let mut session = handle.lock();
        validate_chain(
            &chain,
            session.buffer().sample_rate() as f32,
            self.config.max_chain_len,
        )?;
        tracing::debug!(session = %id, effects = chain.len(), "chain configured");
        session.set_chain(chain);
        Ok(())
    }

    /// The session's configured chain.
    pub fn chain(&self, id: SessionId) -> Result<Vec<EffectSpec>, EngineError> {
        Ok(self.session(id)?.lock().chain().to_vec())
    }

    /// Runs the session's configured chain.
    ///
    /// The chain is read and run under one hold of the session lock, so a
    /// concurrent [`set_chain`](Self::set_chain) lands entirely before or
    /// after. Fails with [`EffectError::EmptyChain`] if none was set.
    pub fn apply_chain(&self, id: SessionId) -> Result<ChainSummary, EngineError> {
        let handle = self.session(id)?;
        let session = handle.lock();
        let chain = session.chain().to_vec();
        if chain.is_empty() {
            return Err(EffectError::EmptyChain.into());
        }
        self.run_chain(id, session, &chain)
    }

    /// Validates and runs `specs` on a locked session. The lock is released
    /// before events go out.
    fn run_chain(
        &self,
        id: SessionId,
        mut session: MutexGuard<'_, Session>,
        specs: &[EffectSpec],
    ) -> Result<ChainSummary, EngineError> {
        validate_chain(
            specs,
            session.buffer().sample_rate() as f32,
            self.config.max_chain_len,
        )?;

        let effects = session.process(specs, self.persist_target())?;
        let status = session.status();
        let source = session.source().cloned();
        drop(session);

        self.applied(id, specs, &effects, &status, source.as_ref());
        let summary = ChainSummary {
            samples_processed: effects.first().map_or(0, |e| e.samples_processed),
            total_duration: effects.iter().map(|e| e.duration).sum(),
            effects,
        };
        tracing::debug!(
            session = %id,
            effects = summary.effects.len(),
            samples = summary.samples_processed,
            "chain applied"
        );
        Ok(summary)
    }

    fn applied(
        &self,
        id: SessionId,
        specs: &[EffectSpec],
        summaries: &[ApplySummary],
        status: &BufferStatus,
        source: Option<&FileId>,
    ) {
        for summary in summaries {
            self.events.emit(StatusEvent::EffectApplied {
                session: id,
                effect: summary.effect,
                samples: summary.samples_processed,
            });
        }
        self.buffer_changed(id, status);
        if let Some(file) = source {
            self.record_file_history(file, specs, summaries);
        }
    }

    /// Appends applied effects to the history of the file the session's
    /// samples came from, writing the record through to the metadata store.
    ///
    /// The effects already ran, so failures here are logged, not returned.
    fn record_file_history(&self, file: &FileId, specs: &[EffectSpec], summaries: &[ApplySummary]) {
        let mut updated = None;
        for (spec, summary) in specs.iter().zip(summaries) {
            let entry = FileProcessingEntry {
                timestamp_ms: now_ms(),
                effect: summary.effect.to_string(),
                parameters: serde_json::to_value(spec).unwrap_or_default(),
                session: summary.session.get(),
                samples_processed: summary.samples_processed,
                output: summary.output.clone(),
            };
            updated = self
                .index
                .record_processing(file, entry, self.config.history_cap);
            if updated.is_none() {
                tracing::debug!(file = %file, "source file no longer indexed, history skipped");
                return;
            }
        }

        if let (Some(meta), Some(store)) = (updated, &self.metadata_store)
            && let Err(e) = store.upsert(&meta)
        {
            tracing::warn!(file = %file, error = %e, "failed to persist file history");
        }
    }

    // --- Analysis & history ---

    /// Measures the session's available samples without consuming them.
    pub fn analyze(&self, id: SessionId) -> Result<AudioAnalysis, EngineError> {
        let handle = self.session(id)?;
        let (samples, sample_rate) = {
            let session = handle.lock();
            let buffer = session.buffer();
            (buffer.peek(buffer.available()), buffer.sample_rate())
        };
        Ok(AudioAnalysis::of(&samples, sample_rate))
    }

    /// Frame-based features of the session's available samples, without
    /// consuming them.
    ///
    /// Fails with [`EngineError::EmptyBuffer`] when nothing is buffered.
    pub fn extract_features(&self, id: SessionId, kind: FeatureKind) -> Result<FeatureSet, EngineError> {
        let handle = self.session(id)?;
        let (samples, sample_rate) = {
            let session = handle.lock();
            let buffer = session.buffer();
            (buffer.peek(buffer.available()), buffer.sample_rate())
        };
        if samples.is_empty() {
            return Err(EngineError::EmptyBuffer(id));
        }

        let features = cadenza_analysis::extract_features(&samples, sample_rate, kind);
        tracing::debug!(session = %id, kind = %kind, frames = features.frames, "features extracted");
        Ok(features)
    }

    /// Processing history, most recent first.
    pub fn get_history(&self, id: SessionId) -> Result<Vec<ProcessingRecord>, EngineError> {
        Ok(self.session(id)?.lock().history().cloned().collect())
    }

    /// A receiver for status events.
    pub fn subscribe(&self) -> Receiver<StatusEvent> {
        self.events.subscribe()
    }

    /// The event queue.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // --- Files ---

    /// The shared file index.
    pub fn index(&self) -> &SharedFileIndex {
        &self.index
    }

    /// Rebuilds the index from the metadata store. Returns the file count.
    pub fn load_index(&self) -> Result<usize, EngineError> {
        let store = self
            .metadata_store
            .as_ref()
            .ok_or(EngineError::NotConfigured("metadata store"))?;
        let files = store
            .load_all()
            .map_err(|source| EngineError::MetadataStore { source })?;
        let count = files.len();
        self.index.replace_all(files);
        tracing::info!(files = count, "index loaded from metadata store");
        Ok(count)
    }

    /// Records a file, writing through to the metadata store first.
    ///
    /// Returns the record it replaced, if the id was already indexed.
    pub fn register_file(&self, meta: FileMetadata) -> Result<Option<FileMetadata>, EngineError> {
        if let Some(store) = &self.metadata_store {
            store
                .upsert(&meta)
                .map_err(|source| EngineError::MetadataStore { source })?;
        }
        let id = meta.id.clone();
        let replaced = self.index.insert(meta);
        tracing::debug!(file = %id, replaced = replaced.is_some(), "file registered");
        self.events.emit(StatusEvent::FileRegistered { file: id });
        Ok(replaced)
    }

    /// Looks a file up by id.
    pub fn find_file(&self, id: &FileId) -> Result<FileMetadata, EngineError> {
        Ok(self.index.require(id)?)
    }

    /// Removes a file from the metadata store and the index.
    pub fn remove_file(&self, id: &FileId) -> Result<FileMetadata, EngineError> {
        if !self.index.contains(id) {
            return Err(IndexError::FileNotFound(id.clone()).into());
        }
        if let Some(store) = &self.metadata_store {
            store
                .delete(id)
                .map_err(|source| EngineError::MetadataStore { source })?;
        }
        let removed = self
            .index
            .remove(id)
            .ok_or_else(|| IndexError::FileNotFound(id.clone()))?;
        tracing::debug!(file = %id, "file removed");
        self.events.emit(StatusEvent::FileRemoved { file: id.clone() });
        Ok(removed)
    }

    /// Decoded audio for a file, from the cache or the decoder.
    pub fn get_or_decode(&self, id: &FileId) -> Result<Arc<DecodedAudio>, EngineError> {
        let store = self
            .blob_store
            .as_deref()
            .ok_or(EngineError::NotConfigured("blob store"))?;
        let decoder = self
            .decoder
            .as_deref()
            .ok_or(EngineError::NotConfigured("decoder"))?;
        Ok(self.index.get_or_decode(id, store, decoder)?)
    }

    /// Decodes a file and pushes its samples into a session.
    ///
    /// Decoding happens before the session lock is taken. Returns how many
    /// samples fit.
    pub fn load_file_into_session(&self, id: SessionId, file: &FileId) -> Result<usize, EngineError> {
        let handle = self.session(id)?;
        let audio = self.get_or_decode(file)?;
        let (written, status) = {
            let mut session = handle.lock();
            if session.buffer().sample_rate() != audio.sample_rate {
                tracing::warn!(
                    session = %id,
                    file = %file,
                    file_rate = audio.sample_rate,
                    session_rate = session.buffer().sample_rate(),
                    "sample rate mismatch, loading without resampling"
                );
            }
            let written = session.buffer_mut().write(&audio.samples);
            if written > 0 {
                session.set_source(Some(file.clone()));
            }
            (written, session.status())
        };
        tracing::debug!(session = %id, file = %file, written, "file loaded into session");
        self.buffer_changed(id, &status);
        Ok(written)
    }
}
