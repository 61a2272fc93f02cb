//! Per-encounter session context.
//!
//! `EncounterSession` is the explicit state object the voice layer
//! drives: it owns the catalog handle, the active patient context, the
//! order queue, and the confirmation slot, and exposes one entry point,
//! `handle_utterance`. Every path returns a feedback string; nothing in
//! here panics on bad input, because a misheard command must never
//! halt the documentation session.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use clinvox_catalog::{Catalog, ImagingStudy, Medication, OrderSet};
use clinvox_core::config::FeedbackConfig;
use clinvox_core::store::QueueStore;
use clinvox_core::types::{Order, OrderStatus, PatientContext};

use crate::confirmation::ConfirmationSlot;
use crate::intent::{classify, Intent};
use crate::order_set;
use crate::parser::{build_imaging_order, build_lab_order, build_medication_order};
use crate::queue::OrderQueue;
use crate::safety;

/// Note editor seam. Staged plan lines are buffered in the queue while
/// no note is open and flushed once one is.
pub trait PlanWriter {
    fn note_open(&self) -> bool;
    fn append_line(&mut self, line: &str);
}

/// Text-to-speech seam; the engine supplies text only.
pub trait SpeechSink {
    fn speak(&mut self, message: &str);
}

/// Payload for the UI layer to render alongside spoken feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub title: String,
    pub body: String,
}

/// Result of handling one finalized transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtteranceOutcome {
    pub feedback: String,
    pub overlay: Option<Overlay>,
}

impl UtteranceOutcome {
    fn plain(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            overlay: None,
        }
    }

    pub fn announce(&self, sink: &mut dyn SpeechSink) {
        sink.speak(&self.feedback);
    }
}

pub struct EncounterSession {
    catalog: Arc<Catalog>,
    store: Arc<dyn QueueStore>,
    feedback: FeedbackConfig,
    patient: Option<PatientContext>,
    queue: OrderQueue,
    slot: ConfirmationSlot,
}

impl EncounterSession {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn QueueStore>) -> Self {
        Self {
            catalog,
            store,
            feedback: FeedbackConfig::default(),
            patient: None,
            queue: OrderQueue::new(""),
            slot: ConfirmationSlot::new(),
        }
    }

    pub fn with_feedback(mut self, feedback: FeedbackConfig) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn patient(&self) -> Option<&PatientContext> {
        self.patient.as_ref()
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.slot.is_awaiting()
    }

    /// Load a patient, restoring any queue persisted for them. Any
    /// pending confirmation from the previous patient is discarded.
    pub fn set_patient(&mut self, patient: PatientContext) {
        info!(patient = %patient.patient_id, "Patient context loaded");
        self.queue = OrderQueue::load_for_patient(&patient.patient_id, self.store.as_ref());
        self.slot = ConfirmationSlot::new();
        self.patient = Some(patient);
    }

    /// Drop the patient context and its in-memory queue.
    pub fn clear_patient(&mut self) {
        if let Some(patient) = self.patient.take() {
            info!(patient = %patient.patient_id, "Patient context cleared");
        }
        self.queue = OrderQueue::new("");
        self.slot = ConfirmationSlot::new();
    }

    /// Handle one finalized speech transcript.
    pub fn handle_utterance(&mut self, text: &str) -> UtteranceOutcome {
        let catalog = Arc::clone(&self.catalog);
        match classify(&catalog, text) {
            Intent::ConfirmPending => self.on_confirm(),
            Intent::RejectPending => self.on_reject(),
            Intent::CancelLastOrder => self.on_cancel_last(),
            Intent::ClearAllOrders => self.on_clear_all(),
            Intent::OrderSet(set) => self.on_order_set(set),
            Intent::OrderLab(lab) => self.on_candidate(build_lab_order(lab)),
            Intent::OrderImaging(study) => self.on_order_imaging(text, study),
            Intent::PrescribeMedication(med) => self.on_prescribe(text, med),
            Intent::Unrecognized => self.on_unrecognized(),
        }
    }

    /// Flush buffered plan lines into the note once one is open.
    pub fn flush_plan_lines(&mut self, writer: &mut dyn PlanWriter) {
        if !writer.note_open() {
            return;
        }
        for line in self.queue.take_staged_plan_lines() {
            writer.append_line(&line);
        }
    }

    fn on_unrecognized(&self) -> UtteranceOutcome {
        let suggestions = ["'order CBC'", "'prescribe amoxicillin'", "'order chest pain workup'"];
        let shown: Vec<&str> = suggestions
            .iter()
            .take(self.feedback.max_suggestions.max(1))
            .copied()
            .collect();
        UtteranceOutcome::plain(format!("Command not recognized. Try {}.", shown.join(", ")))
    }

    fn on_confirm(&mut self) -> UtteranceOutcome {
        match self.slot.confirm() {
            Some(order) => {
                let name = order.display_name.clone();
                self.queue.add(order, self.store.as_ref());
                UtteranceOutcome::plain(format!("Order placed: {}.", name))
            }
            None => UtteranceOutcome::plain("There is no order waiting for confirmation."),
        }
    }

    fn on_reject(&mut self) -> UtteranceOutcome {
        match self.slot.reject() {
            Some(order) => {
                UtteranceOutcome::plain(format!("Order discarded: {}.", order.display_name))
            }
            None => UtteranceOutcome::plain("There is no order waiting for confirmation."),
        }
    }

    fn on_cancel_last(&mut self) -> UtteranceOutcome {
        if self.patient.is_none() {
            return UtteranceOutcome::plain(NO_PATIENT);
        }
        match self.queue.cancel_last(self.store.as_ref()) {
            Some(order) => {
                UtteranceOutcome::plain(format!("Cancelled last order: {}.", order.display_name))
            }
            None => UtteranceOutcome::plain("There are no orders to cancel."),
        }
    }

    fn on_clear_all(&mut self) -> UtteranceOutcome {
        if self.patient.is_none() {
            return UtteranceOutcome::plain(NO_PATIENT);
        }
        let count = self.queue.len();
        self.queue.clear_all(self.store.as_ref());
        UtteranceOutcome::plain(format!("Cleared {} order{}.", count, plural(count)))
    }

    fn on_order_set(&mut self, set: &OrderSet) -> UtteranceOutcome {
        let Some(patient) = self.patient.clone() else {
            return UtteranceOutcome::plain(NO_PATIENT);
        };
        if self.slot.is_awaiting() {
            return UtteranceOutcome::plain(PENDING_FIRST);
        }

        let outcome =
            order_set::process(set, &self.catalog, &mut self.queue, &patient, self.store.as_ref());
        let overlay = if outcome.warnings.is_empty() {
            None
        } else {
            Some(Overlay {
                title: format!("{} warnings", outcome.set_name),
                body: outcome.warnings.join("\n"),
            })
        };
        UtteranceOutcome {
            feedback: outcome.summary(),
            overlay,
        }
    }

    fn on_order_imaging(&mut self, text: &str, study: &ImagingStudy) -> UtteranceOutcome {
        self.on_candidate(build_imaging_order(text, study))
    }

    fn on_prescribe(&mut self, text: &str, med: &Medication) -> UtteranceOutcome {
        self.on_candidate(build_medication_order(text, med))
    }

    /// Common path for a single-order candidate: evaluate safety, then
    /// either queue directly or hold for confirmation.
    fn on_candidate(&mut self, mut order: Order) -> UtteranceOutcome {
        let Some(patient) = self.patient.clone() else {
            return UtteranceOutcome::plain(NO_PATIENT);
        };
        if self.slot.is_awaiting() {
            return UtteranceOutcome::plain(PENDING_FIRST);
        }

        let warnings = safety::evaluate(&order, &self.catalog, self.queue.orders(), &patient);
        order.requires_confirmation = !warnings.is_empty();
        order.warnings = warnings;

        if !order.requires_confirmation {
            order.status = OrderStatus::Confirmed;
            let feedback = if order.details.is_empty() {
                format!("Ordered {}.", order.display_name)
            } else {
                format!("Ordered {} ({}).", order.display_name, order.details)
            };
            self.queue.add(order, self.store.as_ref());
            return UtteranceOutcome::plain(feedback);
        }

        let summaries: Vec<String> = order
            .warnings
            .iter()
            .map(|w| format!("{}: {}", w.severity.to_string().to_uppercase(), w.message))
            .collect();
        let feedback = if self.feedback.verbose_warnings {
            format!(
                "{} has {} safety warning{}: {} Say yes to confirm or no to cancel.",
                order.display_name,
                summaries.len(),
                plural(summaries.len()),
                summaries.join("; ") + ".",
            )
        } else {
            // Overlay still carries the full text.
            format!(
                "{} has {} safety warning{}. Say yes to confirm or no to cancel.",
                order.display_name,
                summaries.len(),
                plural(summaries.len()),
            )
        };
        let overlay = Some(Overlay {
            title: format!("Safety warning: {}", order.display_name),
            body: summaries.join("\n"),
        });

        // hold() cannot fail here, the awaiting case was handled above.
        if let Err(refused) = self.slot.hold(order) {
            return UtteranceOutcome::plain(format!(
                "{} Could not hold {}.",
                PENDING_FIRST, refused.display_name
            ));
        }
        UtteranceOutcome { feedback, overlay }
    }
}

const NO_PATIENT: &str = "No patient loaded. Load a patient before placing orders.";
const PENDING_FIRST: &str = "Please resolve the pending order first, yes or no.";

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
