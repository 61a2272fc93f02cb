//! Order-set (bundle) expansion.
//!
//! Expands a resolved order set into its constituent items, running
//! each through the same parser and safety evaluation as a single
//! order. Unlike single orders, the batch never pauses for
//! confirmation: every item is queued, and warnings ride along on the
//! orders and in the returned summary, high severity first. Bundles
//! are used in time-critical workups, so one flagged item must not
//! block the rest.

use tracing::{info, warn};

use clinvox_catalog::{Catalog, OrderSet};
use clinvox_core::store::QueueStore;
use clinvox_core::types::{OrderStatus, OrderType, PatientContext, Severity};

use crate::parser::{build_imaging_order, build_lab_order, build_medication_order};
use crate::queue::OrderQueue;
use crate::safety;

/// Result of expanding one order set.
#[derive(Debug)]
pub struct OrderSetOutcome {
    pub set_name: String,
    /// Display names of the queued items, in bundle order.
    pub ordered: Vec<String>,
    /// Warning summaries for display/speech, highest severity first.
    pub warnings: Vec<String>,
}

/// Expand `set`, queueing every resolvable item as Confirmed.
pub fn process(
    set: &OrderSet,
    catalog: &Catalog,
    queue: &mut OrderQueue,
    patient: &PatientContext,
    store: &dyn QueueStore,
) -> OrderSetOutcome {
    let mut ordered = Vec::new();
    let mut flagged: Vec<(Severity, String)> = Vec::new();

    for item in &set.items {
        let hint = item.detail_hint.as_deref().unwrap_or("");
        let candidate = match item.item_type {
            OrderType::Lab => catalog.lab_by_key(&item.catalog_key).map(build_lab_order),
            OrderType::Imaging => catalog
                .imaging_by_key(&item.catalog_key)
                .map(|study| build_imaging_order(hint, study)),
            OrderType::Medication => catalog
                .medication_by_key(&item.catalog_key)
                .map(|med| build_medication_order(hint, med)),
        };
        let Some(mut order) = candidate else {
            warn!(key = %item.catalog_key, set = %set.key, "Order set references unknown catalog key");
            flagged.push((
                Severity::Low,
                format!("Could not resolve {} from {}", item.catalog_key, set.name),
            ));
            continue;
        };

        let item_warnings = safety::evaluate(&order, catalog, queue.orders(), patient);
        for warning in &item_warnings {
            flagged.push((
                warning.severity,
                format!(
                    "{}: {}",
                    warning.severity.to_string().to_uppercase(),
                    warning.message
                ),
            ));
        }
        order.warnings = item_warnings;
        // Batch items are queued regardless of warnings; the summary
        // surfaces anything high-severity.
        order.requires_confirmation = false;
        order.status = OrderStatus::Confirmed;
        ordered.push(order.display_name.clone());
        queue.add(order, store);
    }

    flagged.sort_by(|a, b| b.0.cmp(&a.0));
    let warnings: Vec<String> = flagged.into_iter().map(|(_, text)| text).collect();

    info!(
        set = %set.key,
        ordered = ordered.len(),
        warnings = warnings.len(),
        "Order set processed"
    );
    OrderSetOutcome {
        set_name: set.name.clone(),
        ordered,
        warnings,
    }
}

impl OrderSetOutcome {
    /// One-line spoken/display summary.
    pub fn summary(&self) -> String {
        if self.warnings.is_empty() {
            format!("{}: {} orders placed", self.set_name, self.ordered.len())
        } else {
            format!(
                "{}: {} orders placed, {} warning{}. {}",
                self.set_name,
                self.ordered.len(),
                self.warnings.len(),
                if self.warnings.len() == 1 { "" } else { "s" },
                self.warnings.join("; ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinvox_core::store::MemoryQueueStore;

    fn catalog() -> Catalog {
        Catalog::standard()
    }

    fn patient() -> PatientContext {
        PatientContext::new("pt-1")
    }

    #[test]
    fn test_chest_pain_workup_queues_six_orders() {
        let c = catalog();
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        let set = c.find_order_set("chest pain workup").unwrap();

        let outcome = process(set, &c, &mut queue, &patient(), &store);
        assert_eq!(outcome.ordered.len(), 6);
        assert!(outcome.warnings.is_empty());
        assert_eq!(queue.len(), 6);
        assert!(queue.orders().iter().all(|o| o.status == OrderStatus::Confirmed));
        assert_eq!(store.persisted_len(), Some(6));
    }

    #[test]
    fn test_duplicate_items_are_queued_with_warning() {
        let c = catalog();
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        let set = c.find_order_set("chest pain workup").unwrap();

        // Troponin is already queued before the workup runs.
        let mut existing = build_lab_order(c.lab_by_key("troponin").unwrap());
        existing.status = OrderStatus::Confirmed;
        queue.add(existing, &store);

        let outcome = process(set, &c, &mut queue, &patient(), &store);
        // Still queued despite the duplicate.
        assert_eq!(outcome.ordered.len(), 6);
        assert_eq!(queue.len(), 7);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].starts_with("MODERATE:"));
    }

    #[test]
    fn test_metformin_contrast_warning_leads_summary() {
        let c = catalog();
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        let mut p = patient();
        p.current_medications.push("metformin 500 mg BID".to_string());

        // Abdominal pain workup includes a contrast-preferred CT and a
        // duplicate-prone lab once one is pre-queued.
        let mut existing = build_lab_order(c.lab_by_key("cbc").unwrap());
        existing.status = OrderStatus::Confirmed;
        queue.add(existing, &store);

        let set = c.find_order_set("abdominal pain workup").unwrap();
        let outcome = process(set, &c, &mut queue, &p, &store);

        assert!(outcome.warnings.len() >= 2);
        // High contraindication sorts before the moderate duplicate.
        assert!(outcome.warnings[0].starts_with("HIGH:"));
        assert!(outcome.warnings[0].contains("metformin"));
        // Every item still queued.
        assert_eq!(outcome.ordered.len(), set.items.len());
    }

    #[test]
    fn test_detail_hint_drives_contrast_parsing() {
        let c = catalog();
        let store = MemoryQueueStore::new();
        let mut queue = OrderQueue::new("pt-1");
        let set = c.find_order_set("stroke workup").unwrap();

        process(set, &c, &mut queue, &patient(), &store);
        let ct = queue
            .orders()
            .iter()
            .find(|o| o.canonical_name.contains("CT Head"))
            .unwrap();
        // Hint says non-contrast.
        assert_eq!(ct.contrast, Some(false));
    }

    #[test]
    fn test_summary_formats() {
        let quiet = OrderSetOutcome {
            set_name: "Sepsis Workup".to_string(),
            ordered: vec!["A".to_string(), "B".to_string()],
            warnings: vec![],
        };
        assert_eq!(quiet.summary(), "Sepsis Workup: 2 orders placed");

        let noisy = OrderSetOutcome {
            set_name: "Sepsis Workup".to_string(),
            ordered: vec!["A".to_string()],
            warnings: vec!["HIGH: something".to_string()],
        };
        assert!(noisy.summary().contains("1 warning."));
        assert!(noisy.summary().contains("HIGH: something"));
    }
}
