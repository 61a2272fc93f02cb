//! Schema versioning.
//!
//! The order queue persists as one JSON document per named key, so the
//! whole schema is a key-value table plus the version ledger. Versions
//! are tracked in `schema_migrations` and applied in order on open.

use rusqlite::Connection;
use tracing::info;

use clinvox_core::error::ClinVoxError;

/// Bring the schema up to the current version.
pub fn run_migrations(conn: &Connection) -> Result<(), ClinVoxError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| ClinVoxError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| ClinVoxError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: key-value state table.
fn apply_v1(conn: &Connection) -> Result<(), ClinVoxError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_state (
            key         TEXT PRIMARY KEY NOT NULL,
            payload     TEXT NOT NULL,
            updated_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| ClinVoxError::Storage(format!("Failed to apply v1 schema: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
