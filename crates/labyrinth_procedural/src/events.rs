//! # Generation Events
//!
//! Lifecycle notifications from the generator to whoever is waiting on a
//! level: the host spawns the player on [`GenerationEvent::Completed`],
//! a loading screen tracks [`GenerationEvent::PhaseEntered`], and so on.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │  Generator  │─────>│   Event     │─────>│    Host     │
//! │  (step)     │      │   Channel   │      │  (frame)    │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! Bounded crossbeam channel; the generator never blocks on a slow reader.
//! Events left unread when a new session starts are discarded, so the
//! channel only ever holds the current session's history.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Default channel capacity. A session emits `2 + phases` events.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Totals for a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Seed the session ran with.
    pub seed: u64,
    /// Instances placed, start part included.
    pub instances: usize,
    /// Connections recorded, incidental ones included.
    pub links: usize,
    /// Connections closed because two connectors happened to coincide.
    pub incidental_links: usize,
    /// Outbound connectors left unresolved.
    pub open_connectors: usize,
    /// Steps taken, the final idle transition included.
    pub steps: u64,
}

/// Generator lifecycle events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationEvent {
    /// The start part was placed.
    Started {
        /// Seed the session runs with.
        seed: u64,
    },

    /// A phase became current.
    PhaseEntered {
        /// Position in the phase list.
        index: usize,
        /// Phase name.
        name: String,
        /// Connectors queued on entry.
        open_connectors: usize,
    },

    /// The session went idle. Emitted exactly once per session.
    Completed(GenerationSummary),
}

/// Event bus owned by a generator.
pub struct EventBus {
    sender: Sender<GenerationEvent>,
    receiver: Receiver<GenerationEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Throws away every undelivered event. Returns how many were dropped.
    #[must_use]
    pub fn discard_pending(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<GenerationEvent>,
}

impl EventSender {
    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: GenerationEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!("Event channel full, dropped {:?}", dropped);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<GenerationEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<GenerationEvent> {
        let mut events = Vec::with_capacity(8);
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<GenerationEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_send_receive() {
        let bus = EventBus::new(16);
        let sender = bus.sender();
        let receiver = bus.receiver();

        assert!(sender.send(GenerationEvent::Started { seed: 42 }));
        assert!(receiver.has_events());
        assert_eq!(receiver.try_recv(), Some(GenerationEvent::Started { seed: 42 }));
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_event_drain() {
        let bus = EventBus::default();
        let sender = bus.sender();
        let receiver = bus.receiver();

        for index in 0..5 {
            let _ = sender.send(GenerationEvent::PhaseEntered {
                index,
                name: format!("phase{index}"),
                open_connectors: 1,
            });
        }

        assert_eq!(receiver.pending_count(), 5);
        let events = receiver.drain();
        assert_eq!(events.len(), 5);
        assert!(!receiver.has_events());
    }

    #[test]
    fn test_full_channel_drops() {
        let bus = EventBus::new(1);
        let sender = bus.sender();
        assert!(sender.send(GenerationEvent::Started { seed: 1 }));
        assert!(!sender.send(GenerationEvent::Started { seed: 2 }));
        assert_eq!(bus.receiver().drain(), vec![GenerationEvent::Started { seed: 1 }]);
    }

    #[test]
    fn test_discard_pending_frees_capacity() {
        let bus = EventBus::new(2);
        let sender = bus.sender();
        let receiver = bus.receiver();
        assert!(sender.send(GenerationEvent::Started { seed: 1 }));
        assert!(sender.send(GenerationEvent::Started { seed: 2 }));

        assert_eq!(bus.discard_pending(), 2);
        assert!(!receiver.has_events());
        assert!(sender.send(GenerationEvent::Started { seed: 3 }));
        assert_eq!(receiver.drain(), vec![GenerationEvent::Started { seed: 3 }]);
    }
}
