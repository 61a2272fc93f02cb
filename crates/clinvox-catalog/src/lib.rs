//! Static clinical reference catalogs for ClinVox.
//!
//! Labs, imaging studies, medications, and order sets, each carrying the
//! spoken aliases the resolver matches against. Catalogs are immutable,
//! built once at process start, and shared read-only.

pub mod data;
pub mod resolver;
pub mod types;

pub use types::{Catalog, ImagingStudy, LabTest, Medication, OrderSet, OrderSetItem};
