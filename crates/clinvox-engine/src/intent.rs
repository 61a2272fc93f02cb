//! Voice command classification.
//!
//! Turns a raw transcript into a typed `Intent` before the engine sees
//! it, so order handling never branches on raw text. Catalog resolution
//! happens here, once; order-set aliases are checked before single
//! entries so "chest pain workup" never resolves to the chest X-ray
//! entry.

use clinvox_catalog::{Catalog, ImagingStudy, LabTest, Medication, OrderSet};

/// What the user meant, resolved against the catalog.
#[derive(Debug)]
pub enum Intent<'a> {
    /// "yes" / "confirm" / "place order" for the pending order.
    ConfirmPending,
    /// "no" / "reject" / "don't order" for the pending order.
    RejectPending,
    /// "cancel last order" / "undo that order".
    CancelLastOrder,
    /// "clear all orders".
    ClearAllOrders,
    OrderSet(&'a OrderSet),
    OrderLab(&'a LabTest),
    OrderImaging(&'a ImagingStudy),
    PrescribeMedication(&'a Medication),
    Unrecognized,
}

/// Word-boundary check so "no" never fires inside "now" or "order".
fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token.eq_ignore_ascii_case(word))
}

fn is_confirmation(text: &str) -> bool {
    has_word(text, "yes")
        || has_word(text, "yeah")
        || has_word(text, "yep")
        || text.contains("confirm")
        || text.contains("place order")
        || text.contains("place the order")
}

fn is_rejection(text: &str) -> bool {
    has_word(text, "no")
        || has_word(text, "nope")
        || text.contains("reject")
        || text.contains("don't order")
        || text.contains("do not order")
}

fn is_cancel_last(text: &str) -> bool {
    text.contains("cancel last")
        || text.contains("cancel the last")
        || text.contains("cancel that order")
        || text.contains("undo last")
        || text.contains("undo that order")
}

fn is_clear_all(text: &str) -> bool {
    // "all" must stand alone so "clear allergy list" never wipes the
    // queue.
    text.contains("clear all orders")
        || text.contains("clear orders")
        || (text.contains("clear") && has_word(text, "all"))
}

/// Classify one finalized transcript.
///
/// Priority is fixed: confirmation and rejection first (they must win
/// while an order is pending), then queue commands, then catalog
/// resolution from most-specific to least (order set, medication,
/// imaging, lab).
pub fn classify<'a>(catalog: &'a Catalog, text: &str) -> Intent<'a> {
    let lowered = text.to_lowercase();

    if is_confirmation(&lowered) {
        return Intent::ConfirmPending;
    }
    if is_rejection(&lowered) {
        return Intent::RejectPending;
    }
    if is_cancel_last(&lowered) {
        return Intent::CancelLastOrder;
    }
    if is_clear_all(&lowered) {
        return Intent::ClearAllOrders;
    }

    if let Some(set) = catalog.find_order_set(&lowered) {
        return Intent::OrderSet(set);
    }
    if let Some(med) = catalog.find_medication(&lowered) {
        return Intent::PrescribeMedication(med);
    }
    if let Some(study) = catalog.find_imaging(&lowered) {
        return Intent::OrderImaging(study);
    }
    if let Some(lab) = catalog.find_lab(&lowered) {
        return Intent::OrderLab(lab);
    }

    Intent::Unrecognized
}
