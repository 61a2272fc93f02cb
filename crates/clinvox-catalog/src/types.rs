//! Catalog record types.
//!
//! Reference records are plain data: canonical name, coding identifier,
//! spoken aliases, and type-specific attributes. Nothing here is mutated
//! after `Catalog::standard()` builds the tables.

use clinvox_core::types::OrderType;
use serde::{Deserialize, Serialize};

/// Anything with a spoken-alias list the resolver can match against.
pub trait Aliased {
    fn aliases(&self) -> &[String];
}

/// An orderable laboratory test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    /// Stable catalog key, referenced by order-set items.
    pub key: String,
    pub name: String,
    /// LOINC code for the panel/test.
    pub loinc_code: String,
    pub aliases: Vec<String>,
}

impl Aliased for LabTest {
    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// An orderable imaging study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagingStudy {
    pub key: String,
    pub name: String,
    /// CPT code for the study.
    pub code: String,
    pub aliases: Vec<String>,
    pub body_part: String,
    pub modality: String,
    /// Whether the study can be performed with IV contrast.
    pub supports_contrast: bool,
}

impl Aliased for ImagingStudy {
    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// A prescribable medication with the safety metadata the rule engine
/// consumes: drug class, interacting classes/agents, and the allergy
/// cross-reaction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub key: String,
    pub name: String,
    /// RxNorm concept identifier.
    pub rxnorm_code: String,
    pub aliases: Vec<String>,
    pub drug_class: String,
    pub route: String,
    /// Default dose options; the first is the fallback when the utterance
    /// carries no dose.
    pub common_doses: Vec<String>,
    pub common_frequencies: Vec<String>,
    pub common_durations: Vec<String>,
    /// Class names and agent names this medication interacts with,
    /// matched against the patient's current-medication strings.
    pub interacting_classes: Vec<String>,
    /// Class/agent names matched against the patient's recorded allergies.
    pub allergy_cross_reactions: Vec<String>,
    pub controlled: bool,
}

impl Aliased for Medication {
    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// One constituent of an order set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSetItem {
    pub item_type: OrderType,
    /// Key of the lab/imaging entry this item expands to.
    pub catalog_key: String,
    pub detail_hint: Option<String>,
}

/// A named bundle of catalog entries ordered together for one clinical
/// scenario (e.g. "chest pain workup").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSet {
    pub key: String,
    pub name: String,
    pub description: String,
    pub items: Vec<OrderSetItem>,
    pub aliases: Vec<String>,
}

impl Aliased for OrderSet {
    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// The full reference catalog, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub labs: Vec<LabTest>,
    pub imaging: Vec<ImagingStudy>,
    pub medications: Vec<Medication>,
    pub order_sets: Vec<OrderSet>,
}

impl Catalog {
    pub fn lab_by_key(&self, key: &str) -> Option<&LabTest> {
        self.labs.iter().find(|l| l.key == key)
    }

    pub fn imaging_by_key(&self, key: &str) -> Option<&ImagingStudy> {
        self.imaging.iter().find(|i| i.key == key)
    }

    pub fn medication_by_key(&self, key: &str) -> Option<&Medication> {
        self.medications.iter().find(|m| m.key == key)
    }

    /// Look up a medication by its canonical name (case-insensitive).
    pub fn medication_by_name(&self, name: &str) -> Option<&Medication> {
        self.medications
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Look up an imaging study by its canonical name (case-insensitive).
    pub fn imaging_by_name(&self, name: &str) -> Option<&ImagingStudy> {
        self.imaging
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_serde_round_trip() {
        let lab = LabTest {
            key: "cbc".to_string(),
            name: "Complete Blood Count".to_string(),
            loinc_code: "58410-2".to_string(),
            aliases: vec!["cbc".to_string(), "complete blood count".to_string()],
        };
        let json = serde_json::to_string(&lab).unwrap();
        let rt: LabTest = serde_json::from_str(&json).unwrap();
        assert_eq!(rt, lab);
    }

    #[test]
    fn test_order_set_item_serde() {
        let item = OrderSetItem {
            item_type: clinvox_core::types::OrderType::Lab,
            catalog_key: "troponin".to_string(),
            detail_hint: Some("serial troponin".to_string()),
        };
        let json = serde_json::to_string(&item).unwrap();
        let rt: OrderSetItem = serde_json::from_str(&json).unwrap();
        assert_eq!(rt, item);
    }
}
