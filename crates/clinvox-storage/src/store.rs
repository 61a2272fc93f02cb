//! SQLite-backed order queue persistence.
//!
//! The full queue snapshot (patient identifier plus every order with
//! its nested warnings) serializes as one JSON document under the
//! single key `order_queue`. Every save replaces the previous
//! snapshot.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use clinvox_core::error::{ClinVoxError, Result};
use clinvox_core::store::QueueStore;
use clinvox_core::types::PersistedQueue;

use crate::db::Database;

const QUEUE_KEY: &str = "order_queue";

/// `QueueStore` implementation over the shared [`Database`].
pub struct SqliteQueueStore {
    db: Arc<Database>,
}

impl SqliteQueueStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl QueueStore for SqliteQueueStore {
    fn save(&self, queue: &PersistedQueue) -> Result<()> {
        let payload = serde_json::to_string(queue)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_state (key, payload, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET
                     payload = excluded.payload,
                     updated_at = excluded.updated_at",
                params![QUEUE_KEY, payload],
            )
            .map_err(|e| ClinVoxError::Storage(format!("Failed to save order queue: {}", e)))?;
            Ok(())
        })?;
        debug!(
            patient = %queue.patient_id,
            orders = queue.orders.len(),
            "Order queue persisted"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedQueue>> {
        let payload: Option<String> = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT payload FROM kv_state WHERE key = ?1",
                params![QUEUE_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ClinVoxError::Storage(format!("Failed to load order queue: {}", e)))
        })?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn clear(&self) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM kv_state WHERE key = ?1", params![QUEUE_KEY])
                .map_err(|e| ClinVoxError::Storage(format!("Failed to clear order queue: {}", e)))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinvox_core::types::{Order, OrderStatus, OrderType, SafetyWarning, Severity, WarningType};

    fn store() -> SqliteQueueStore {
        SqliteQueueStore::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn sample_queue() -> PersistedQueue {
        let mut order = Order::new(
            OrderType::Medication,
            "Amoxicillin",
            "Amoxicillin",
            "500 mg TID for 10 days",
        );
        order.status = OrderStatus::Confirmed;
        order.dose = Some("500 mg".to_string());
        order.warnings.push(SafetyWarning::new(
            WarningType::Allergy,
            Severity::High,
            "Patient has a recorded allergy to penicillin relevant to Amoxicillin",
        ));

        PersistedQueue {
            patient_id: "pt-1".to_string(),
            orders: vec![order],
        }
    }

    #[test]
    fn test_load_empty_store() {
        let store = store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = store();
        let queue = sample_queue();
        store.save(&queue).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, queue);
        // Warnings nest inside the order.
        assert_eq!(loaded.orders[0].warnings.len(), 1);
        assert_eq!(loaded.orders[0].warnings[0].severity, Severity::High);
    }

    #[test]
    fn test_save_replaces_snapshot() {
        let store = store();
        store.save(&sample_queue()).unwrap();

        let empty = PersistedQueue {
            patient_id: "pt-2".to_string(),
            orders: vec![],
        };
        store.save(&empty).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.patient_id, "pt-2");
        assert!(loaded.orders.is_empty());
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let store = store();
        store.save(&sample_queue()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");

        {
            let db = Arc::new(Database::new(&path).unwrap());
            let store = SqliteQueueStore::new(db);
            store.save(&sample_queue()).unwrap();
        }

        let db = Arc::new(Database::new(&path).unwrap());
        let store = SqliteQueueStore::new(db);
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.patient_id, "pt-1");
        assert_eq!(loaded.orders.len(), 1);
    }
}
