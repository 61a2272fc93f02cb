//! Per-patient queue of confirmed orders.
//!
//! Every mutation persists the full snapshot immediately through the
//! `QueueStore`. A failed write is logged and marks the queue dirty;
//! the in-memory copy stays authoritative for the rest of the session
//! and the next mutation retries the write. Each successful `add` also
//! stages a plan line for the note editor, buffered until a note is
//! open.

use tracing::{info, warn};

use clinvox_core::store::QueueStore;
use clinvox_core::types::{Order, PersistedQueue};

#[derive(Debug)]
pub struct OrderQueue {
    patient_id: String,
    orders: Vec<Order>,
    staged_plan_lines: Vec<String>,
    dirty: bool,
}

impl OrderQueue {
    /// Empty queue for a patient.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            orders: Vec::new(),
            staged_plan_lines: Vec::new(),
            dirty: false,
        }
    }

    /// Restore the queue persisted for `patient_id`.
    ///
    /// A snapshot saved under a different patient identifier is ignored
    /// and the queue starts empty; orders never leak across patients.
    pub fn load_for_patient(patient_id: &str, store: &dyn QueueStore) -> Self {
        let orders = match store.load() {
            Ok(Some(persisted)) if persisted.patient_id == patient_id => {
                info!(
                    patient = patient_id,
                    count = persisted.orders.len(),
                    "Restored persisted order queue"
                );
                persisted.orders
            }
            Ok(Some(persisted)) => {
                info!(
                    persisted_patient = %persisted.patient_id,
                    requested_patient = patient_id,
                    "Persisted queue belongs to a different patient, starting empty"
                );
                Vec::new()
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "Failed to load persisted order queue, starting empty");
                Vec::new()
            }
        };
        Self {
            patient_id: patient_id.to_string(),
            orders,
            staged_plan_lines: Vec::new(),
            dirty: false,
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Whether the last persistence attempt failed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Append a confirmed order, stage its plan line, and persist.
    pub fn add(&mut self, order: Order, store: &dyn QueueStore) {
        self.staged_plan_lines.push(plan_line(&order));
        info!(order = %order.display_name, patient = %self.patient_id, "Order queued");
        self.orders.push(order);
        self.persist(store);
    }

    /// Remove and return the most recently added order. No-op on empty.
    ///
    /// If the order's plan line is still staged (the note never opened),
    /// the line is dropped too so a cancelled order never reaches the
    /// note.
    pub fn cancel_last(&mut self, store: &dyn QueueStore) -> Option<Order> {
        let removed = self.orders.pop()?;
        let line = plan_line(&removed);
        if let Some(pos) = self.staged_plan_lines.iter().rposition(|l| l == &line) {
            self.staged_plan_lines.remove(pos);
        }
        info!(order = %removed.display_name, "Cancelled last order");
        self.persist(store);
        Some(removed)
    }

    /// Empty the queue and any staged plan lines, then persist.
    pub fn clear_all(&mut self, store: &dyn QueueStore) {
        let count = self.orders.len();
        self.orders.clear();
        self.staged_plan_lines.clear();
        info!(count, "Cleared all orders");
        self.persist(store);
    }

    /// Drain the plan lines staged since the last drain.
    pub fn take_staged_plan_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.staged_plan_lines)
    }

    fn persist(&mut self, store: &dyn QueueStore) {
        let snapshot = PersistedQueue {
            patient_id: self.patient_id.clone(),
            orders: self.orders.clone(),
        };
        match store.save(&snapshot) {
            Ok(()) => self.dirty = false,
            Err(err) => {
                // In-memory state stays authoritative; retried on the
                // next mutation.
                warn!(%err, "Failed to persist order queue, continuing unpersisted");
                self.dirty = true;
            }
        }
    }
}

fn plan_line(order: &Order) -> String {
    format!("\u{2022} Order {}", order.display_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinvox_core::store::MemoryQueueStore;
    use clinvox_core::types::{OrderStatus, OrderType};

    fn confirmed(name: &str) -> Order {
        let mut order = Order::new(OrderType::Lab, name, name, "");
        order.status = OrderStatus::Confirmed;
        order
    }

    #[test]
    fn test_add_persists_and_stages_plan_line() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");

        queue.add(confirmed("Complete Blood Count"), &store);
        assert_eq!(queue.len(), 1);
        assert_eq!(store.persisted_len(), Some(1));
        assert_eq!(
            queue.take_staged_plan_lines(),
            vec!["\u{2022} Order Complete Blood Count".to_string()]
        );
        // Drained once; nothing left.
        assert!(queue.take_staged_plan_lines().is_empty());
    }

    #[test]
    fn test_cancel_last_removes_most_recent() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        queue.add(confirmed("CBC"), &store);
        queue.add(confirmed("BMP"), &store);

        let removed = queue.cancel_last(&store).unwrap();
        assert_eq!(removed.display_name, "BMP");
        assert_eq!(queue.len(), 1);
        assert_eq!(store.persisted_len(), Some(1));
    }

    #[test]
    fn test_cancel_last_drops_its_staged_plan_line() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        queue.add(confirmed("CBC"), &store);
        queue.add(confirmed("BMP"), &store);

        queue.cancel_last(&store);
        // Only the surviving order's line flushes to the note.
        assert_eq!(
            queue.take_staged_plan_lines(),
            vec!["\u{2022} Order CBC".to_string()]
        );
    }

    #[test]
    fn test_cancel_last_after_flush_leaves_drained_lines_alone() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        queue.add(confirmed("CBC"), &store);
        let flushed = queue.take_staged_plan_lines();
        assert_eq!(flushed.len(), 1);

        // Line already in the note; cancel only touches the queue.
        queue.cancel_last(&store);
        assert!(queue.is_empty());
        assert!(queue.take_staged_plan_lines().is_empty());
    }

    #[test]
    fn test_cancel_last_on_empty_is_noop() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        assert!(queue.cancel_last(&store).is_none());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_clear_all_empties_orders_and_plan_lines() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        queue.add(confirmed("CBC"), &store);
        queue.add(confirmed("BMP"), &store);

        queue.clear_all(&store);
        assert!(queue.is_empty());
        assert!(queue.take_staged_plan_lines().is_empty());
        assert_eq!(store.persisted_len(), Some(0));
    }

    #[test]
    fn test_load_restores_same_patient() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        queue.add(confirmed("CBC"), &store);

        let restored = OrderQueue::load_for_patient("pt-1", &store);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.orders()[0].display_name, "CBC");
    }

    #[test]
    fn test_load_for_different_patient_starts_empty() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-a");
        queue.add(confirmed("CBC"), &store);

        let other = OrderQueue::load_for_patient("pt-b", &store);
        assert!(other.is_empty());
    }

    #[test]
    fn test_failed_write_keeps_memory_state_and_retries() {
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        queue.add(confirmed("CBC"), &store);

        store.set_fail_writes(true);
        queue.add(confirmed("BMP"), &store);
        // Memory is authoritative even though the write failed.
        assert_eq!(queue.len(), 2);
        assert!(queue.is_dirty());
        assert_eq!(store.persisted_len(), Some(1));

        // Next successful mutation persists the full current state.
        store.set_fail_writes(false);
        queue.add(confirmed("Troponin I"), &store);
        assert!(!queue.is_dirty());
        assert_eq!(store.persisted_len(), Some(3));
    }
}
