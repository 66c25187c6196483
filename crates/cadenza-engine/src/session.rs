//! One client's buffer, configured chain and processing log.

use crate::store::ProcessedStore;
use crate::EngineError;
use cadenza_core::{BufferStatus, SampleBuffer};
use cadenza_effects::{EffectKind, EffectSpec};
use cadenza_index::{FileId, now_ms};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Identifier handed out by the [`SessionRegistry`](crate::SessionRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Wraps a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overrides for [`Engine::create_session_with`](crate::Engine::create_session_with).
///
/// Unset fields fall back to the engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Display name. Defaults to `"session-<id>"`.
    pub name: Option<String>,
    /// Sample rate of the audio the client will push.
    pub sample_rate: Option<u32>,
    /// Buffer capacity in samples.
    pub capacity: Option<usize>,
}

impl SessionOptions {
    /// Sets the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Sets the buffer capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

/// One effect application, appended to the session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingRecord {
    /// Effect and the parameters it ran with.
    pub effect: EffectSpec,
    /// Wall-clock time of the application, ms since the Unix epoch.
    pub timestamp_ms: u64,
    /// Samples run through the effect.
    pub samples_processed: usize,
    /// Time spent rendering.
    pub duration: Duration,
    /// Where the processed output was persisted, if it was.
    pub output: Option<String>,
}

/// Result of a single effect application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplySummary {
    /// Session the effect ran on.
    pub session: SessionId,
    /// Effect kind.
    pub effect: EffectKind,
    /// Samples run through the effect.
    pub samples_processed: usize,
    /// Time spent rendering.
    pub duration: Duration,
    /// Persisted output location.
    pub output: Option<String>,
}

/// Result of a chain application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSummary {
    /// Samples fed into the chain.
    pub samples_processed: usize,
    /// Sum of every step's duration.
    pub total_duration: Duration,
    /// Per-effect results in chain order.
    pub effects: Vec<ApplySummary>,
}

/// Listing entry for [`Engine::list_sessions`](crate::Engine::list_sessions).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    /// Session id.
    pub id: SessionId,
    /// Display name.
    pub name: String,
    /// Creation time, ms since the Unix epoch.
    pub created_at_ms: u64,
    /// Buffer sample rate.
    pub sample_rate: u32,
    /// Buffer capacity.
    pub capacity: usize,
    /// Unread samples.
    pub available: usize,
    /// `available / capacity`.
    pub utilization: f32,
    /// Configured chain length.
    pub chain_len: usize,
    /// Records in the history log.
    pub history_len: usize,
}

/// Session state. Always accessed through the registry's per-session mutex.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    name: String,
    created_at_ms: u64,
    buffer: SampleBuffer,
    chain: Vec<EffectSpec>,
    history: VecDeque<ProcessingRecord>,
    history_cap: usize,
    source: Option<FileId>,
}

impl Session {
    /// Creates a session owning `buffer`, keeping at most `history_cap` records.
    pub fn new(id: SessionId, name: impl Into<String>, buffer: SampleBuffer, history_cap: usize) -> Self {
        let history_cap = history_cap.max(1);
        Self {
            id,
            name: name.into(),
            created_at_ms: now_ms(),
            buffer,
            chain: Vec::new(),
            history: VecDeque::with_capacity(history_cap),
            history_cap,
            source: None,
        }
    }

    /// Session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The session's sample buffer.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Mutable access to the sample buffer.
    pub fn buffer_mut(&mut self) -> &mut SampleBuffer {
        &mut self.buffer
    }

    /// Buffer counters.
    pub fn status(&self) -> BufferStatus {
        self.buffer.status()
    }

    /// Indexed file the buffered samples were loaded from, if any.
    pub fn source(&self) -> Option<&FileId> {
        self.source.as_ref()
    }

    /// Records which file the buffer now holds.
    pub fn set_source(&mut self, source: Option<FileId>) {
        self.source = source;
    }

    /// Currently configured chain.
    pub fn chain(&self) -> &[EffectSpec] {
        &self.chain
    }

    /// Replaces the configured chain. Validation is the caller's job.
    pub fn set_chain(&mut self, chain: Vec<EffectSpec>) {
        self.chain = chain;
    }

    /// History, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &ProcessingRecord> {
        self.history.iter()
    }

    /// Records in the history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Appends a record, dropping the oldest beyond the cap.
    pub fn record(&mut self, record: ProcessingRecord) {
        self.history.push_front(record);
        self.history.truncate(self.history_cap);
    }

    /// Listing entry.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            name: self.name.clone(),
            created_at_ms: self.created_at_ms,
            sample_rate: self.buffer.sample_rate(),
            capacity: self.buffer.capacity(),
            available: self.buffer.available(),
            utilization: self.buffer.utilization(),
            chain_len: self.chain.len(),
            history_len: self.history.len(),
        }
    }

    /// Name processed output of `kind` is persisted under.
    pub fn output_name(&self, kind: EffectKind) -> String {
        format!("processed_{}_{}", self.id, kind)
    }

    /// Runs already-validated `specs` in order over every available sample.
    ///
    /// Every step renders before anything is persisted. The buffer is only
    /// touched once all outputs are stored; on error it still holds the
    /// original samples and outputs stored so far are removed again.
    pub(crate) fn process(
        &mut self,
        specs: &[EffectSpec],
        store: Option<&dyn ProcessedStore>,
    ) -> Result<Vec<ApplySummary>, EngineError> {
        let sample_rate = self.buffer.sample_rate();
        let mut current = self.buffer.peek(self.buffer.available());
        let count = current.len();

        let mut rendered = Vec::with_capacity(specs.len());
        let mut steps = Vec::new();
        for spec in specs {
            let started = Instant::now();
            current = spec.render(&current, sample_rate as f32);
            rendered.push((spec, started.elapsed()));
            if store.is_some() {
                steps.push(current.clone());
            }
        }

        let outputs = match store {
            Some(store) => self.persist(store, specs, &steps, sample_rate)?,
            None => vec![None; specs.len()],
        };

        self.buffer.discard(count);
        let written = self.buffer.write(&current);
        debug_assert_eq!(written, count, "effects preserve length");

        let records: Vec<ProcessingRecord> = rendered
            .into_iter()
            .zip(outputs)
            .map(|((spec, duration), output)| ProcessingRecord {
                effect: spec.clone(),
                timestamp_ms: now_ms(),
                samples_processed: count,
                duration,
                output,
            })
            .collect();

        let summaries = records
            .iter()
            .map(|r| ApplySummary {
                session: self.id,
                effect: r.effect.kind(),
                samples_processed: r.samples_processed,
                duration: r.duration,
                output: r.output.clone(),
            })
            .collect();
        for record in records {
            self.record(record);
        }
        Ok(summaries)
    }

    /// Stores each step's output, removing the earlier ones if any fails.
    fn persist(
        &self,
        store: &dyn ProcessedStore,
        specs: &[EffectSpec],
        steps: &[Vec<f32>],
        sample_rate: u32,
    ) -> Result<Vec<Option<String>>, EngineError> {
        let mut stored: Vec<String> = Vec::with_capacity(steps.len());
        for (spec, samples) in specs.iter().zip(steps) {
            match store.store(&self.output_name(spec.kind()), samples, sample_rate) {
                Ok(location) => stored.push(location),
                Err(source) => {
                    stored.sort();
                    stored.dedup();
                    for location in &stored {
                        if let Err(e) = store.remove(location) {
                            tracing::warn!(
                                session = %self.id,
                                location = %location,
                                error = %e,
                                "failed to roll back processed output"
                            );
                        }
                    }
                    return Err(EngineError::Persist { source });
                }
            }
        }
        Ok(stored.into_iter().map(Some).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_effects::{DelayParams, NormalizeParams};

    fn session(capacity: usize, history_cap: usize) -> Session {
        Session::new(SessionId::new(1), "test", SampleBuffer::new(capacity, 44100), history_cap)
    }

    #[test]
    fn test_history_capped_most_recent_first() {
        let mut s = session(16, 3);
        for i in 0..5 {
            s.record(ProcessingRecord {
                effect: NormalizeParams::default().into(),
                timestamp_ms: i,
                samples_processed: 0,
                duration: Duration::ZERO,
                output: None,
            });
        }
        let stamps: Vec<u64> = s.history().map(|r| r.timestamp_ms).collect();
        assert_eq!(stamps, vec![4, 3, 2]);
    }

    #[test]
    fn test_process_preserves_available_and_order_position() {
        let mut s = session(8, 10);
        s.buffer_mut().write(&[0.1, -0.05, 0.02]);
        let spec: EffectSpec = NormalizeParams { target_level: -6.0 }.into();

        let summaries = s.process(&[spec], None).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].samples_processed, 3);
        assert_eq!(summaries[0].effect, EffectKind::Normalize);
        assert_eq!(s.buffer().available(), 3);

        let out = s.buffer_mut().drain();
        let target = 10f32.powf(-6.0 / 20.0);
        assert!((out[0] - target).abs() < 1e-4);
        assert_eq!(s.history_len(), 1);
    }

    #[test]
    fn test_process_chain_records_each_step() {
        let mut s = session(32, 10);
        s.buffer_mut().write(&[0.2; 20]);
        let chain: Vec<EffectSpec> = vec![
            DelayParams::default().into(),
            NormalizeParams::default().into(),
        ];
        let summaries = s.process(&chain, None).unwrap();
        assert_eq!(summaries.len(), 2);
        let kinds: Vec<EffectKind> = s.history().map(|r| r.effect.kind()).collect();
        assert_eq!(kinds, vec![EffectKind::Normalize, EffectKind::Delay]);
    }

    #[test]
    fn test_output_name() {
        let s = session(4, 1);
        assert_eq!(s.output_name(EffectKind::Reverb), "processed_1_reverb");
    }
}
