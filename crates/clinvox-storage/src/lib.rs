//! SQLite persistence for the order queue.
//!
//! Provides a WAL-mode SQLite database with migrations and the
//! [`SqliteQueueStore`] implementation of `clinvox_core::QueueStore`.

pub mod db;
pub mod migrations;
pub mod store;

pub use db::Database;
pub use store::SqliteQueueStore;
