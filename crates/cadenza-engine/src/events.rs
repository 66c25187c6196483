//! Outbound status events.
//!
//! The engine pushes [`StatusEvent`]s into a bounded channel and never
//! blocks on delivery: when the queue is full the oldest queued event is
//! discarded to make room, so a late subscriber sees the most recent state.
//! The transport layer drains the queue through a [`Receiver`] from
//! [`EventBus::subscribe`].

use crate::SessionId;
use cadenza_effects::EffectKind;
use cadenza_index::FileId;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use serde::Serialize;

/// Buffer counters carried by [`StatusEvent::BufferChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BufferLevel {
    /// Unread samples.
    pub available: usize,
    /// Total slots.
    pub capacity: usize,
    /// `available / capacity`.
    pub utilization: f32,
}

/// A discrete state change the transport may want to forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    /// A session was created.
    SessionCreated {
        /// New session.
        session: SessionId,
    },
    /// A session was destroyed.
    SessionDestroyed {
        /// Removed session.
        session: SessionId,
    },
    /// Samples were written, read, processed or cleared.
    BufferChanged {
        /// Affected session.
        session: SessionId,
        /// Counters after the change.
        level: BufferLevel,
    },
    /// An effect finished.
    EffectApplied {
        /// Affected session.
        session: SessionId,
        /// Effect that ran.
        effect: EffectKind,
        /// Samples it processed.
        samples: usize,
    },
    /// A file entered the index.
    FileRegistered {
        /// Indexed file.
        file: FileId,
    },
    /// A file left the index.
    FileRemoved {
        /// Removed file.
        file: FileId,
    },
}

/// Bounded, non-blocking event queue.
///
/// Every subscriber shares one queue, so each event reaches exactly one of
/// them. Hand a single receiver to the transport if every event matters.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: Sender<StatusEvent>,
    rx: Receiver<StatusEvent>,
}

impl EventBus {
    /// Creates a queue holding at most `capacity` undelivered events.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Queues `event`, discarding the oldest queued events while the
    /// queue is full.
    ///
    /// Returns the number of older events discarded.
    pub fn emit(&self, event: StatusEvent) -> usize {
        let mut event = event;
        let mut discarded = 0;
        loop {
            match self.tx.try_send(event) {
                Ok(()) => break,
                Err(TrySendError::Full(rejected)) => {
                    event = rejected;
                    if self.rx.try_recv().is_ok() {
                        discarded += 1;
                    }
                }
                // we hold a receiver ourselves, so the channel never disconnects
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
        if discarded > 0 {
            tracing::debug!(discarded, "status queue full, oldest events discarded");
        }
        discarded
    }

    /// A receiver for queued events.
    pub fn subscribe(&self) -> Receiver<StatusEvent> {
        self.rx.clone()
    }

    /// Removes and returns every queued event.
    pub fn drain(&self) -> Vec<StatusEvent> {
        self.rx.try_iter().collect()
    }

    /// Events currently queued.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_receive() {
        let bus = EventBus::new(4);
        let rx = bus.subscribe();
        assert_eq!(
            bus.emit(StatusEvent::SessionCreated {
                session: SessionId::new(1)
            }),
            0
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StatusEvent::SessionCreated {
                session: SessionId::new(1)
            }
        );
    }

    #[test]
    fn test_full_queue_keeps_newest_without_blocking() {
        let bus = EventBus::new(2);
        let discarded: usize = (0..5)
            .map(|i| {
                bus.emit(StatusEvent::SessionDestroyed {
                    session: SessionId::new(i),
                })
            })
            .sum();
        assert_eq!(discarded, 3);
        assert_eq!(bus.pending(), 2);
        let drained = bus.drain();
        assert_eq!(
            drained,
            vec![
                StatusEvent::SessionDestroyed {
                    session: SessionId::new(3)
                },
                StatusEvent::SessionDestroyed {
                    session: SessionId::new(4)
                },
            ]
        );
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_late_subscriber_sees_latest_event() {
        let bus = EventBus::new(4);
        for i in 0..300 {
            bus.emit(StatusEvent::SessionCreated {
                session: SessionId::new(i),
            });
        }
        let rx = bus.subscribe();
        let seen: Vec<StatusEvent> = rx.try_iter().collect();
        assert_eq!(seen.len(), 4);
        assert_eq!(
            seen.last(),
            Some(&StatusEvent::SessionCreated {
                session: SessionId::new(299)
            })
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event = StatusEvent::FileRemoved {
            file: FileId::from("a"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"file_removed","file":"a"}"#);
    }
}
