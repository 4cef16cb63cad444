//! # Message Repository
//!
//! A per-test collector that handlers record into. Injected through the
//! handler context; each test constructs its own, so parallel tests never
//! observe one another.

use std::sync::Arc;

use parking_lot::Mutex;

/// Records what the handlers saw, in handling order.
#[derive(Debug, Clone, Default)]
pub struct MessageRepository {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|entry| entry.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
