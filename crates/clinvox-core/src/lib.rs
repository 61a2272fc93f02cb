//! Shared domain types for ClinVox.
//!
//! Defines orders, safety warnings, patient context, the persistence
//! contract, configuration, and error types used by every other crate.

pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod types;

pub use config::ClinVoxConfig;
pub use error::{ClinVoxError, Result};
pub use store::{MemoryQueueStore, QueueStore};
pub use types::{
    Laterality, Order, OrderStatus, OrderType, PatientContext, PersistedQueue, SafetyWarning,
    Severity, WarningType,
};
