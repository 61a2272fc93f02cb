//! Safety rule evaluation for candidate orders.
//!
//! Four independent rules, all evaluated on every candidate (no
//! short-circuiting, so one order can carry multiple warnings):
//!
//! 1. Duplicate order already in the queue (moderate).
//! 2. Allergy cross-reaction for medications (high).
//! 3. Drug-drug interaction against current medications (high/moderate).
//! 4. Contrast study while the patient is on metformin (high).
//!
//! Evaluation is pure: the queue and patient context are read-only and
//! the candidate order is not touched. The caller attaches the returned
//! warnings and sets `requires_confirmation`.

use tracing::debug;

use clinvox_catalog::{Catalog, Medication};
use clinvox_core::types::{Order, OrderType, PatientContext, SafetyWarning, Severity, WarningType};

/// Agents whose combination with an opioid is flagged high.
const SEDATIVE_AGENTS: &[&str] = &["lorazepam", "diazepam", "alprazolam", "benzodiazepine", "alcohol"];

/// NSAID terms for the lithium pairing rule.
const NSAID_AGENTS: &[&str] = &["ibuprofen", "naproxen", "nsaid"];

/// Evaluate a candidate order against the queue and patient state.
pub fn evaluate(
    order: &Order,
    catalog: &Catalog,
    queued: &[Order],
    patient: &PatientContext,
) -> Vec<SafetyWarning> {
    let mut warnings = Vec::new();

    check_duplicate(order, queued, &mut warnings);
    if order.order_type == OrderType::Medication {
        if let Some(med) = catalog.medication_by_name(&order.canonical_name) {
            check_allergy(order, med, patient, &mut warnings);
            check_interactions(order, med, patient, &mut warnings);
        }
    }
    if order.order_type == OrderType::Imaging {
        check_contrast(order, catalog, patient, &mut warnings);
    }

    if !warnings.is_empty() {
        debug!(
            order = %order.display_name,
            count = warnings.len(),
            "Safety evaluation produced warnings"
        );
    }
    warnings
}

/// Case-insensitive substring match in both directions. Allergy and
/// medication strings are free text, so "penicillins" must match the
/// class term "penicillin" and vice versa.
fn terms_overlap(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

fn check_duplicate(order: &Order, queued: &[Order], warnings: &mut Vec<SafetyWarning>) {
    let duplicate = queued.iter().any(|existing| {
        existing.order_type == order.order_type
            && existing.canonical_name.eq_ignore_ascii_case(&order.canonical_name)
    });
    if duplicate {
        warnings.push(SafetyWarning::new(
            WarningType::DuplicateOrder,
            Severity::Moderate,
            format!("{} is already in the order queue", order.display_name),
        ));
    }
}

fn check_allergy(
    order: &Order,
    med: &Medication,
    patient: &PatientContext,
    warnings: &mut Vec<SafetyWarning>,
) {
    let name = med.name.to_lowercase();
    let direct_terms: Vec<String> = std::iter::once(name)
        .chain(med.aliases.iter().map(|a| a.to_lowercase()))
        .collect();

    for allergy in &patient.allergies {
        let allergy_lc = allergy.to_lowercase();

        let direct_hit = direct_terms.iter().any(|t| terms_overlap(&allergy_lc, t));
        let class_hits: Vec<&String> = med
            .allergy_cross_reactions
            .iter()
            .filter(|class| terms_overlap(&allergy_lc, &class.to_lowercase()))
            .collect();

        if direct_hit || !class_hits.is_empty() {
            let mut warning = SafetyWarning::new(
                WarningType::Allergy,
                Severity::High,
                format!(
                    "Patient has a recorded allergy to {} relevant to {}",
                    allergy, order.display_name
                ),
            );
            if !class_hits.is_empty() {
                let classes: Vec<&str> = class_hits.iter().map(|c| c.as_str()).collect();
                warning = warning.with_details(format!("Cross-reactive classes: {}", classes.join(", ")));
            }
            warnings.push(warning);
        }
    }
}

fn check_interactions(
    order: &Order,
    med: &Medication,
    patient: &PatientContext,
    warnings: &mut Vec<SafetyWarning>,
) {
    // One warning per matched current medication, not per interacting
    // term, so "warfarin" matched by two terms reports once.
    let mut matched: Vec<&str> = Vec::new();

    for current in &patient.current_medications {
        let current_lc = current.to_lowercase();
        let hit = med
            .interacting_classes
            .iter()
            .find(|term| terms_overlap(&current_lc, &term.to_lowercase()));
        let Some(term) = hit else {
            continue;
        };
        if matched.iter().any(|m| m.eq_ignore_ascii_case(current)) {
            continue;
        }
        matched.push(current);

        let severity = interaction_severity(med, term);
        warnings.push(
            SafetyWarning::new(
                WarningType::DrugInteraction,
                severity,
                format!("{} interacts with current medication {}", order.display_name, current),
            )
            .with_details(format!("Interacting class: {}", term)),
        );
    }
}

/// High-severity pairings: opioid with a benzodiazepine or alcohol,
/// anything interacting with warfarin, and NSAID with lithium (either
/// side prescribed). Everything else is moderate.
fn interaction_severity(med: &Medication, term: &str) -> Severity {
    let term_lc = term.to_lowercase();
    if term_lc.contains("warfarin") {
        return Severity::High;
    }
    if med.drug_class == "opioid" && SEDATIVE_AGENTS.contains(&term_lc.as_str()) {
        return Severity::High;
    }
    if med.drug_class == "nsaid" && term_lc.contains("lithium") {
        return Severity::High;
    }
    if med.name.eq_ignore_ascii_case("lithium") && NSAID_AGENTS.contains(&term_lc.as_str()) {
        return Severity::High;
    }
    Severity::Moderate
}

fn check_contrast(
    order: &Order,
    catalog: &Catalog,
    patient: &PatientContext,
    warnings: &mut Vec<SafetyWarning>,
) {
    let supports_contrast = catalog
        .imaging_by_name(&order.canonical_name)
        .map(|study| study.supports_contrast)
        .unwrap_or(false);

    // The rule fires when contrast is requested outright, or when the
    // modality can use contrast and the utterance left it unspecified.
    let contrast_possible = match order.contrast {
        Some(true) => true,
        Some(false) => false,
        None => supports_contrast,
    };
    if !contrast_possible {
        return;
    }

    let on_metformin = patient
        .current_medications
        .iter()
        .any(|m| m.to_lowercase().contains("metformin"));
    if on_metformin {
        warnings.push(
            SafetyWarning::new(
                WarningType::Contraindication,
                Severity::High,
                format!(
                    "Patient is on metformin; hold metformin for 48 hours around the contrast study {}",
                    order.display_name
                ),
            )
            .with_details("Lactic acidosis risk with iodinated contrast".to_string()),
        );
    }
}
