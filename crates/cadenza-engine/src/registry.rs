//! Process-wide map of live sessions.
//!
//! The map itself sits behind a reader-writer lock that is only held long
//! enough to clone a session handle. Each session carries its own mutex, so
//! work on one session never waits on another.

use crate::{Session, SessionId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Live sessions keyed by id.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    next_id: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Creates an empty registry. Ids start at 1.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Reserves a fresh id. Ids are never reused.
    pub fn allocate_id(&self) -> SessionId {
        SessionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers `session` under its own id and returns its handle.
    pub fn insert(&self, session: Session) -> SessionHandle {
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().insert(id, Arc::clone(&handle));
        handle
    }

    /// Handle for `id`, if live.
    pub fn get(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.read().get(&id).cloned()
    }

    /// Unregisters `id`. Callers still holding the handle keep the session
    /// alive until they drop it.
    pub fn remove(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.write().remove(&id)
    }

    /// Returns `true` if `id` is live.
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().contains_key(&id)
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Handles of every live session, ordered by id.
    pub fn all(&self) -> Vec<SessionHandle> {
        let sessions = self.sessions.read();
        let mut entries: Vec<(SessionId, SessionHandle)> = sessions
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect();
        drop(sessions);
        entries.sort_unstable_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, handle)| handle).collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns `true` if no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::SampleBuffer;

    fn make(registry: &SessionRegistry) -> SessionId {
        let id = registry.allocate_id();
        registry.insert(Session::new(id, "s", SampleBuffer::new(8, 44100), 4));
        id
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let registry = SessionRegistry::new();
        let a = make(&registry);
        let b = make(&registry);
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(registry.ids(), vec![a, b]);
    }

    #[test]
    fn test_remove_releases_entry() {
        let registry = SessionRegistry::new();
        let a = make(&registry);
        assert!(registry.remove(a).is_some());
        assert!(registry.get(a).is_none());
        assert!(registry.remove(a).is_none());
        assert!(registry.is_empty());

        // removed ids are not handed out again
        let b = make(&registry);
        assert_ne!(a, b);
    }

    #[test]
    fn test_handle_outlives_removal() {
        let registry = SessionRegistry::new();
        let a = make(&registry);
        let handle = registry.get(a).unwrap();
        registry.remove(a);
        handle.lock().buffer_mut().write(&[1.0]);
        assert_eq!(handle.lock().buffer().available(), 1);
    }
}
