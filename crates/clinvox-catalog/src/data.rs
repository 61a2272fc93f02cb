//! The standard reference catalog.
//!
//! A small static table standing in for a real pharmacy/lab knowledge
//! base; production deployments swap this out for a licensed data source.
//! Declaration order matters: the resolver returns the first entry whose
//! alias matches, so more specific entries come first where aliases could
//! overlap.

use clinvox_core::types::OrderType;

use crate::types::{Catalog, ImagingStudy, LabTest, Medication, OrderSet, OrderSetItem};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn lab(key: &str, name: &str, loinc: &str, aliases: &[&str]) -> LabTest {
    LabTest {
        key: key.to_string(),
        name: name.to_string(),
        loinc_code: loinc.to_string(),
        aliases: strings(aliases),
    }
}

fn imaging(
    key: &str,
    name: &str,
    code: &str,
    body_part: &str,
    modality: &str,
    supports_contrast: bool,
    aliases: &[&str],
) -> ImagingStudy {
    ImagingStudy {
        key: key.to_string(),
        name: name.to_string(),
        code: code.to_string(),
        aliases: strings(aliases),
        body_part: body_part.to_string(),
        modality: modality.to_string(),
        supports_contrast,
    }
}

struct MedSpec<'a> {
    key: &'a str,
    name: &'a str,
    rxnorm: &'a str,
    aliases: &'a [&'a str],
    class: &'a str,
    route: &'a str,
    doses: &'a [&'a str],
    frequencies: &'a [&'a str],
    durations: &'a [&'a str],
    interacts: &'a [&'a str],
    cross_reacts: &'a [&'a str],
    controlled: bool,
}

fn medication(spec: MedSpec<'_>) -> Medication {
    Medication {
        key: spec.key.to_string(),
        name: spec.name.to_string(),
        rxnorm_code: spec.rxnorm.to_string(),
        aliases: strings(spec.aliases),
        drug_class: spec.class.to_string(),
        route: spec.route.to_string(),
        common_doses: strings(spec.doses),
        common_frequencies: strings(spec.frequencies),
        common_durations: strings(spec.durations),
        interacting_classes: strings(spec.interacts),
        allergy_cross_reactions: strings(spec.cross_reacts),
        controlled: spec.controlled,
    }
}

fn item(item_type: OrderType, catalog_key: &str, hint: Option<&str>) -> OrderSetItem {
    OrderSetItem {
        item_type,
        catalog_key: catalog_key.to_string(),
        detail_hint: hint.map(|h| h.to_string()),
    }
}

impl Catalog {
    /// Build the standard catalog. Call once at startup and share behind
    /// an `Arc`.
    pub fn standard() -> Self {
        Self {
            labs: standard_labs(),
            imaging: standard_imaging(),
            medications: standard_medications(),
            order_sets: standard_order_sets(),
        }
    }
}

fn standard_labs() -> Vec<LabTest> {
    vec![
        lab(
            "cbc",
            "Complete Blood Count",
            "58410-2",
            &["cbc", "complete blood count", "blood count"],
        ),
        lab(
            "bmp",
            "Basic Metabolic Panel",
            "51990-0",
            &["bmp", "basic metabolic panel", "basic metabolic"],
        ),
        lab(
            "cmp",
            "Comprehensive Metabolic Panel",
            "24323-8",
            &["cmp", "comprehensive metabolic panel", "complete metabolic panel"],
        ),
        lab(
            "troponin",
            "Troponin I",
            "10839-9",
            &["troponin", "trop"],
        ),
        lab(
            "pt_inr",
            "Prothrombin Time / INR",
            "34714-6",
            &["pt inr", "pt and inr", "inr", "prothrombin time", "coags"],
        ),
        lab(
            "lactate",
            "Lactate",
            "2524-7",
            &["lactate", "lactic acid"],
        ),
        lab(
            "blood_cultures",
            "Blood Cultures x2",
            "600-7",
            &["blood cultures", "blood culture"],
        ),
        lab("lipase", "Lipase", "3040-3", &["lipase"]),
        lab(
            "urinalysis",
            "Urinalysis",
            "24356-8",
            &["urinalysis", "urine analysis", "urine dip"],
        ),
        lab(
            "bnp",
            "B-type Natriuretic Peptide",
            "30934-4",
            &["bnp", "natriuretic peptide"],
        ),
        lab(
            "d_dimer",
            "D-dimer",
            "48065-7",
            &["d-dimer", "d dimer", "dimer"],
        ),
        lab(
            "hba1c",
            "Hemoglobin A1c",
            "4548-4",
            &["hemoglobin a1c", "a1c", "hba1c", "glycated hemoglobin"],
        ),
        lab(
            "tsh",
            "Thyroid Stimulating Hormone",
            "3016-3",
            &["tsh", "thyroid stimulating hormone", "thyroid panel"],
        ),
    ]
}

fn standard_imaging() -> Vec<ImagingStudy> {
    vec![
        imaging(
            "chest_xray",
            "Chest X-ray",
            "71046",
            "chest",
            "X-ray",
            false,
            &["chest x-ray", "chest xray", "chest x ray", "cxr", "chest film"],
        ),
        imaging(
            "ct_head",
            "CT Head",
            "70450",
            "head",
            "CT",
            true,
            &["ct head", "head ct", "ct of the head", "head cat scan"],
        ),
        imaging(
            "ct_chest",
            "CT Chest",
            "71260",
            "chest",
            "CT",
            true,
            &["ct chest", "chest ct", "ct of the chest", "chest cat scan"],
        ),
        imaging(
            "ct_abdomen_pelvis",
            "CT Abdomen/Pelvis",
            "74178",
            "abdomen/pelvis",
            "CT",
            true,
            &[
                "ct abdomen",
                "abdominal ct",
                "ct abdomen pelvis",
                "ct of the abdomen",
                "cat scan of the abdomen",
            ],
        ),
        imaging(
            "echo",
            "Transthoracic Echocardiogram",
            "93306",
            "heart",
            "Ultrasound",
            false,
            &["echocardiogram", "echo", "cardiac ultrasound", "transthoracic echo"],
        ),
        imaging(
            "us_abdomen",
            "Abdominal Ultrasound",
            "76700",
            "abdomen",
            "Ultrasound",
            false,
            &["abdominal ultrasound", "ultrasound of the abdomen", "ruq ultrasound"],
        ),
        imaging(
            "mri_brain",
            "MRI Brain",
            "70551",
            "brain",
            "MRI",
            true,
            &["mri brain", "brain mri", "mri of the brain"],
        ),
        imaging(
            "knee_xray",
            "Knee X-ray",
            "73560",
            "knee",
            "X-ray",
            false,
            &["knee x-ray", "knee xray", "knee x ray", "x-ray of the knee", "knee film"],
        ),
    ]
}

fn standard_medications() -> Vec<Medication> {
    vec![
        medication(MedSpec {
            key: "amoxicillin",
            name: "Amoxicillin",
            rxnorm: "723",
            aliases: &["amoxicillin", "amoxil"],
            class: "penicillin",
            route: "oral",
            doses: &["500 mg", "875 mg", "250 mg"],
            frequencies: &["TID", "BID"],
            durations: &["10 days", "7 days"],
            interacts: &["warfarin"],
            cross_reacts: &["penicillin", "ampicillin"],
            controlled: false,
        }),
        medication(MedSpec {
            key: "azithromycin",
            name: "Azithromycin",
            rxnorm: "18631",
            aliases: &["azithromycin", "zithromax", "z-pack", "zpack"],
            class: "macrolide",
            route: "oral",
            doses: &["500 mg", "250 mg"],
            frequencies: &["daily"],
            durations: &["5 days"],
            interacts: &["warfarin"],
            cross_reacts: &[],
            controlled: false,
        }),
        medication(MedSpec {
            key: "ceftriaxone",
            name: "Ceftriaxone",
            rxnorm: "2193",
            aliases: &["ceftriaxone", "rocephin"],
            class: "cephalosporin",
            route: "IV",
            doses: &["1 g", "2 g"],
            frequencies: &["daily"],
            durations: &["7 days"],
            interacts: &[],
            cross_reacts: &["penicillin"],
            controlled: false,
        }),
        medication(MedSpec {
            key: "ibuprofen",
            name: "Ibuprofen",
            rxnorm: "5640",
            aliases: &["ibuprofen", "motrin", "advil"],
            class: "nsaid",
            route: "oral",
            doses: &["600 mg", "400 mg", "800 mg"],
            frequencies: &["TID", "Q6H"],
            durations: &["5 days"],
            interacts: &["warfarin", "lithium"],
            cross_reacts: &["nsaid", "aspirin"],
            controlled: false,
        }),
        medication(MedSpec {
            key: "acetaminophen",
            name: "Acetaminophen",
            rxnorm: "161",
            aliases: &["acetaminophen", "tylenol", "paracetamol"],
            class: "analgesic",
            route: "oral",
            doses: &["650 mg", "1000 mg"],
            frequencies: &["Q6H"],
            durations: &["5 days"],
            interacts: &[],
            cross_reacts: &[],
            controlled: false,
        }),
        medication(MedSpec {
            key: "aspirin",
            name: "Aspirin",
            rxnorm: "1191",
            aliases: &["aspirin", "baby aspirin"],
            class: "antiplatelet",
            route: "oral",
            doses: &["81 mg", "325 mg"],
            frequencies: &["daily"],
            durations: &[],
            interacts: &["warfarin"],
            cross_reacts: &["nsaid", "ibuprofen"],
            controlled: false,
        }),
        medication(MedSpec {
            key: "morphine",
            name: "Morphine",
            rxnorm: "7052",
            aliases: &["morphine"],
            class: "opioid",
            route: "IV",
            doses: &["4 mg", "2 mg"],
            frequencies: &["Q4H"],
            durations: &[],
            interacts: &["lorazepam", "diazepam", "alprazolam", "benzodiazepine", "alcohol"],
            cross_reacts: &["opioid", "codeine"],
            controlled: true,
        }),
        medication(MedSpec {
            key: "oxycodone",
            name: "Oxycodone",
            rxnorm: "7804",
            aliases: &["oxycodone", "oxycontin", "roxicodone"],
            class: "opioid",
            route: "oral",
            doses: &["5 mg", "10 mg"],
            frequencies: &["Q6H"],
            durations: &["3 days"],
            interacts: &["lorazepam", "diazepam", "alprazolam", "benzodiazepine", "alcohol"],
            cross_reacts: &["opioid", "codeine"],
            controlled: true,
        }),
        medication(MedSpec {
            key: "lorazepam",
            name: "Lorazepam",
            rxnorm: "6470",
            aliases: &["lorazepam", "ativan"],
            class: "benzodiazepine",
            route: "oral",
            doses: &["1 mg", "0.5 mg", "2 mg"],
            frequencies: &["Q8H"],
            durations: &[],
            interacts: &["morphine", "oxycodone", "opioid", "alcohol"],
            cross_reacts: &[],
            controlled: true,
        }),
        medication(MedSpec {
            key: "warfarin",
            name: "Warfarin",
            rxnorm: "11289",
            aliases: &["warfarin", "coumadin"],
            class: "anticoagulant",
            route: "oral",
            doses: &["5 mg", "2.5 mg"],
            frequencies: &["daily"],
            durations: &[],
            interacts: &["ibuprofen", "naproxen", "aspirin", "amiodarone"],
            cross_reacts: &[],
            controlled: false,
        }),
        medication(MedSpec {
            key: "metformin",
            name: "Metformin",
            rxnorm: "6809",
            aliases: &["metformin", "glucophage"],
            class: "biguanide",
            route: "oral",
            doses: &["500 mg", "1000 mg"],
            frequencies: &["BID"],
            durations: &[],
            interacts: &[],
            cross_reacts: &[],
            controlled: false,
        }),
        medication(MedSpec {
            key: "lisinopril",
            name: "Lisinopril",
            rxnorm: "29046",
            aliases: &["lisinopril", "zestril"],
            class: "ace inhibitor",
            route: "oral",
            doses: &["10 mg", "20 mg"],
            frequencies: &["daily"],
            durations: &[],
            interacts: &["spironolactone", "potassium", "lithium"],
            cross_reacts: &[],
            controlled: false,
        }),
        medication(MedSpec {
            key: "lithium",
            name: "Lithium",
            rxnorm: "6448",
            aliases: &["lithium", "lithium carbonate"],
            class: "mood stabilizer",
            route: "oral",
            doses: &["300 mg", "600 mg"],
            frequencies: &["BID"],
            durations: &[],
            interacts: &["ibuprofen", "naproxen", "lisinopril"],
            cross_reacts: &[],
            controlled: false,
        }),
        medication(MedSpec {
            key: "ondansetron",
            name: "Ondansetron",
            rxnorm: "26225",
            aliases: &["ondansetron", "zofran"],
            class: "antiemetic",
            route: "oral",
            doses: &["4 mg", "8 mg"],
            frequencies: &["Q8H"],
            durations: &[],
            interacts: &[],
            cross_reacts: &[],
            controlled: false,
        }),
    ]
}

fn standard_order_sets() -> Vec<OrderSet> {
    vec![
        OrderSet {
            key: "chest_pain_workup".to_string(),
            name: "Chest Pain Workup".to_string(),
            description: "Initial evaluation for acute chest pain".to_string(),
            items: vec![
                item(OrderType::Lab, "troponin", Some("serial troponin")),
                item(OrderType::Lab, "cbc", None),
                item(OrderType::Lab, "bmp", None),
                item(OrderType::Lab, "pt_inr", None),
                item(OrderType::Imaging, "chest_xray", Some("portable acceptable")),
                item(OrderType::Imaging, "echo", None),
            ],
            aliases: strings(&["chest pain workup", "chest pain panel", "cardiac workup", "rule out mi"]),
        },
        OrderSet {
            key: "sepsis_workup".to_string(),
            name: "Sepsis Workup".to_string(),
            description: "Sepsis screening bundle: cultures before antibiotics".to_string(),
            items: vec![
                item(OrderType::Lab, "cbc", None),
                item(OrderType::Lab, "bmp", None),
                item(OrderType::Lab, "lactate", Some("repeat if > 2")),
                item(OrderType::Lab, "blood_cultures", Some("two sets, prior to antibiotics")),
                item(OrderType::Imaging, "chest_xray", None),
            ],
            aliases: strings(&["sepsis workup", "sepsis bundle", "septic workup"]),
        },
        OrderSet {
            key: "abdominal_pain_workup".to_string(),
            name: "Abdominal Pain Workup".to_string(),
            description: "Evaluation for acute abdominal pain".to_string(),
            items: vec![
                item(OrderType::Lab, "cbc", None),
                item(OrderType::Lab, "cmp", None),
                item(OrderType::Lab, "lipase", None),
                item(OrderType::Lab, "urinalysis", None),
                item(OrderType::Imaging, "ct_abdomen_pelvis", Some("with contrast preferred")),
            ],
            aliases: strings(&["abdominal pain workup", "belly pain workup", "acute abdomen workup"]),
        },
        OrderSet {
            key: "stroke_workup".to_string(),
            name: "Stroke Workup".to_string(),
            description: "Acute stroke evaluation".to_string(),
            items: vec![
                item(OrderType::Lab, "cbc", None),
                item(OrderType::Lab, "bmp", None),
                item(OrderType::Lab, "pt_inr", None),
                item(OrderType::Imaging, "ct_head", Some("non-contrast, stat")),
            ],
            aliases: strings(&["stroke workup", "code stroke workup", "tia workup"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_populated() {
        let catalog = Catalog::standard();
        assert!(catalog.labs.len() >= 10);
        assert!(catalog.imaging.len() >= 6);
        assert!(catalog.medications.len() >= 10);
        assert!(catalog.order_sets.len() >= 3);
    }

    #[test]
    fn test_every_order_set_item_resolves_to_a_catalog_key() {
        let catalog = Catalog::standard();
        for set in &catalog.order_sets {
            for item in &set.items {
                let found = match item.item_type {
                    OrderType::Lab => catalog.lab_by_key(&item.catalog_key).is_some(),
                    OrderType::Imaging => catalog.imaging_by_key(&item.catalog_key).is_some(),
                    OrderType::Medication => {
                        catalog.medication_by_key(&item.catalog_key).is_some()
                    }
                };
                assert!(
                    found,
                    "order set {} references unknown key {}",
                    set.key, item.catalog_key
                );
            }
        }
    }

    #[test]
    fn test_chest_pain_workup_has_six_items() {
        let catalog = Catalog::standard();
        let set = catalog
            .order_sets
            .iter()
            .find(|s| s.key == "chest_pain_workup")
            .unwrap();
        assert_eq!(set.items.len(), 6);
        let labs = set
            .items
            .iter()
            .filter(|i| i.item_type == OrderType::Lab)
            .count();
        assert_eq!(labs, 4);
    }

    #[test]
    fn test_catalog_keys_are_unique() {
        let catalog = Catalog::standard();
        for (i, a) in catalog.labs.iter().enumerate() {
            for b in catalog.labs.iter().skip(i + 1) {
                assert_ne!(a.key, b.key);
            }
        }
        for (i, a) in catalog.medications.iter().enumerate() {
            for b in catalog.medications.iter().skip(i + 1) {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_medications_with_defaults_have_dose_and_frequency() {
        let catalog = Catalog::standard();
        for med in &catalog.medications {
            assert!(!med.common_doses.is_empty(), "{} has no default dose", med.key);
            assert!(
                !med.common_frequencies.is_empty(),
                "{} has no default frequency",
                med.key
            );
        }
    }

    #[test]
    fn test_contrast_capable_modalities() {
        let catalog = Catalog::standard();
        assert!(catalog.imaging_by_key("ct_chest").unwrap().supports_contrast);
        assert!(!catalog.imaging_by_key("chest_xray").unwrap().supports_contrast);
        assert!(!catalog.imaging_by_key("echo").unwrap().supports_contrast);
    }
}
