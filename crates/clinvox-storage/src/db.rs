//! SQLite connection handling for the order store.
//!
//! One connection per process, opened in WAL mode so the engine's
//! write-through saves never block a reader. Opening a database also
//! brings the schema up to date.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use clinvox_core::config::ClinVoxConfig;
use clinvox_core::error::ClinVoxError;

use crate::migrations;

/// Shared handle over the single SQLite connection.
///
/// rusqlite's `Connection` is not `Sync`, so it lives behind a Mutex
/// and every caller borrows it through [`Database::with_conn`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `path`, creating the file and its parent
    /// directory as needed, and migrate the schema.
    pub fn new(path: &Path) -> Result<Self, ClinVoxError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| ClinVoxError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| ClinVoxError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Open the database at the configured location.
    pub fn from_config(config: &ClinVoxConfig) -> Result<Self, ClinVoxError> {
        Self::new(&config.db_path())
    }

    /// In-memory database with the full schema applied, for tests.
    pub fn in_memory() -> Result<Self, ClinVoxError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ClinVoxError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| ClinVoxError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Run `f` against the connection, holding the lock for its
    /// duration.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ClinVoxError>
    where
        F: FnOnce(&Connection) -> Result<T, ClinVoxError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ClinVoxError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM kv_state", [], |row| row.get(0))
                .map_err(|e| ClinVoxError::Storage(e.to_string()))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");
        let db = Database::new(&path).unwrap();

        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM kv_state", [], |row| row.get(0))
                .map_err(|e| ClinVoxError::Storage(e.to_string()))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_from_config_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClinVoxConfig::default();
        config.general.data_dir = dir.path().to_string_lossy().into_owned();

        let _db = Database::from_config(&config).unwrap();
        assert!(dir.path().join("orders.db").exists());
    }

    #[test]
    fn test_wal_mode_enabled() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .map_err(|e| ClinVoxError::Storage(e.to_string()))?;
            // In-memory databases may report "memory" instead of "wal".
            assert!(
                mode == "wal" || mode == "memory",
                "Expected wal or memory, got: {}",
                mode
            );
            Ok(())
        })
        .unwrap();
    }
}
