//! Order queue persistence contract.

use std::sync::Mutex;

use crate::error::{ClinVoxError, Result};
use crate::types::PersistedQueue;

/// Persistence seam for the order queue.
///
/// Every mutating queue operation writes through immediately. A failed
/// write is reported but never rolls back in-memory state; the queue
/// retries on its next mutation.
pub trait QueueStore: Send + Sync {
    /// Persist the full queue snapshot, replacing any previous one.
    fn save(&self, queue: &PersistedQueue) -> Result<()>;

    /// Load the last persisted snapshot, if one exists.
    fn load(&self) -> Result<Option<PersistedQueue>>;

    /// Remove any persisted snapshot.
    fn clear(&self) -> Result<()>;
}

/// In-memory `QueueStore` for tests and hostless embedding.
///
/// `fail_writes` simulates a persistence outage: saves return an error
/// while the stored snapshot keeps its last successful value.
#[derive(Default)]
pub struct MemoryQueueStore {
    snapshot: Mutex<Option<PersistedQueue>>,
    fail_writes: Mutex<bool>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated write failures.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Number of orders in the persisted snapshot, if any.
    pub fn persisted_len(&self) -> Option<usize> {
        self.snapshot.lock().unwrap().as_ref().map(|q| q.orders.len())
    }
}

impl QueueStore for MemoryQueueStore {
    fn save(&self, queue: &PersistedQueue) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(ClinVoxError::Storage("simulated write failure".to_string()));
        }
        *self.snapshot.lock().unwrap() = Some(queue.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedQueue>> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    fn clear(&self) -> Result<()> {
        *self.snapshot.lock().unwrap() = None;
        Ok(())
    }
}
