//! Clinical order safety engine.
//!
//! Turns finalized voice transcripts into safety-checked clinical
//! orders: intent classification, order parsing, safety rule
//! evaluation, a single-slot confirmation state machine, the
//! per-patient order queue, and order-set expansion, all orchestrated
//! by [`session::EncounterSession`].

pub mod confirmation;
pub mod intent;
pub mod order_set;
pub mod parser;
pub mod queue;
pub mod safety;
pub mod session;

pub use confirmation::{ConfirmationSlot, ConfirmationState};
pub use intent::{classify, Intent};
pub use order_set::OrderSetOutcome;
pub use queue::OrderQueue;
pub use session::{EncounterSession, Overlay, PlanWriter, SpeechSink, UtteranceOutcome};
