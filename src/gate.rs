//! Bounded admission control for backend calls.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default number of simultaneous in-flight backend calls.
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 5;

/// Counting semaphore guarding the summarization backend.
///
/// Callers acquire a slot before issuing a request; the slot is released
/// when the returned permit drops, on every exit path including failure.
/// Admission is first-come-first-served with no priorities.
#[derive(Clone)]
pub struct ConcurrencyGate {
    slots: Arc<Semaphore>,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
        }
    }

    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        // The semaphore is never closed, so acquisition cannot fail.
        self.slots
            .clone()
            .acquire_owned()
            .await
            .expect("gate semaphore closed")
    }

    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_CALLS)
    }
}
