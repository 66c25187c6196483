//! Cadenza Engine - sessions, effect application and status events.
//!
//! [`Engine`] is the facade a transport layer drives. It owns:
//!
//! - a [`SessionRegistry`] of [`Session`]s, each with its own
//!   [`SampleBuffer`](cadenza_core::SampleBuffer), configured effect chain and
//!   capped [`ProcessingRecord`] log behind a per-session mutex
//! - the process-wide [`SharedFileIndex`](cadenza_index::SharedFileIndex)
//! - an [`EventBus`] of [`StatusEvent`]s
//!
//! Durable work is delegated to collaborators: a [`ProcessedStore`] for
//! processed output, a [`MetadataStore`] for file records, and the index
//! crate's `BlobStore` and `Decoder` for raw file access.
//!
//! ## Concurrency
//!
//! Operations on different sessions never contend beyond a brief read lock
//! on the registry. Operations on one session are serialized by its mutex
//! in call order. Decoding happens outside every lock.

mod engine;
mod error;
mod events;
mod registry;
mod session;
mod store;

pub use engine::{Engine, EngineStats};
pub use error::EngineError;
pub use events::{BufferLevel, EventBus, StatusEvent};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{
    ApplySummary, ChainSummary, ProcessingRecord, Session, SessionId, SessionInfo, SessionOptions,
};
pub use store::{MetadataStore, ProcessedStore, StoreError};
