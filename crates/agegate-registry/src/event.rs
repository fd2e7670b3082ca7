use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;

use agegate_core::Address;

/// Emitted whenever a record is created or upgraded.
///
/// Carries nothing about the prover beyond the address itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEvent {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    pub prover: Address,
    pub min_age: u64,
    pub timestamp: u64,
}

/// Append-only log of verification events with live fan-out.
pub struct EventLog {
    events: RwLock<Vec<VerificationEvent>>,
    tx: broadcast::Sender<VerificationEvent>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            events: RwLock::new(Vec::new()),
            tx,
        }
    }

    /// Rebuild a log from previously persisted events.
    pub fn restore(capacity: usize, mut events: Vec<VerificationEvent>) -> Self {
        events.sort_by_key(|e| e.sequence);
        let log = Self::new(capacity);
        *log.events.write().unwrap_or_else(PoisonError::into_inner) = events;
        log
    }

    /// Sequence number the next event will get.
    pub fn next_sequence(&self) -> u64 {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len() as u64
    }

    /// Append an event and notify live subscribers.
    ///
    /// Callers serialize appends; `event.sequence` must equal `next_sequence()`.
    pub fn append(&self, event: VerificationEvent) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    /// Events with `sequence >= from`, oldest first.
    pub fn since(&self, from: u64) -> Vec<VerificationEvent> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);
        let start = (from as usize).min(events.len());
        events[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to events appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<VerificationEvent> {
        self.tx.subscribe()
    }
}
