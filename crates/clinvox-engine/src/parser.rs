//! Order construction from a resolved catalog entry plus the raw
//! utterance.
//!
//! Field extraction (dose, frequency, duration, contrast, laterality,
//! PRN) is regex- and table-driven. Any field the utterance does not
//! carry falls back to the catalog entry's first default, so a
//! medication order never leaves dose/frequency/duration unset when the
//! catalog has defaults.

use std::sync::LazyLock;

use regex::Regex;

use clinvox_catalog::{ImagingStudy, LabTest, Medication};
use clinvox_core::types::{Laterality, Order, OrderType};

static DOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(milligrams?|micrograms?|milliliters?|grams?|mg|mcg|ml|g)\b")
        .expect("Invalid dose regex")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bfor\s+(\d+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|fourteen)\s+(days?|weeks?)\b",
    )
    .expect("Invalid duration regex")
});

/// Spoken phrases checked in order; longer phrases come before their
/// prefixes ("three times daily" before "daily").
const FREQUENCY_PHRASES: &[(&str, &str)] = &[
    ("four times daily", "QID"),
    ("four times a day", "QID"),
    ("three times daily", "TID"),
    ("three times a day", "TID"),
    ("twice daily", "BID"),
    ("twice a day", "BID"),
    ("two times a day", "BID"),
    ("every four hours", "Q4H"),
    ("every six hours", "Q6H"),
    ("every eight hours", "Q8H"),
    ("at bedtime", "QHS"),
    ("once daily", "daily"),
    ("once a day", "daily"),
    ("every day", "daily"),
    ("daily", "daily"),
    ("as needed", "PRN"),
    ("when needed", "PRN"),
];

/// Shorthand tokens matched on word boundaries.
const FREQUENCY_TOKENS: &[(&str, &str)] = &[
    ("bid", "BID"),
    ("tid", "TID"),
    ("qid", "QID"),
    ("qhs", "QHS"),
    ("q4h", "Q4H"),
    ("q6h", "Q6H"),
    ("q8h", "Q8H"),
    ("prn", "PRN"),
];

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token.eq_ignore_ascii_case(word))
}

fn normalize_unit(unit: &str) -> &'static str {
    let lowered = unit.to_lowercase();
    if lowered.starts_with("milligram") || lowered == "mg" {
        "mg"
    } else if lowered.starts_with("microgram") || lowered == "mcg" {
        "mcg"
    } else if lowered.starts_with("milliliter") || lowered == "ml" {
        "ml"
    } else {
        "g"
    }
}

fn word_to_number(word: &str) -> Option<u32> {
    match word {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        "fourteen" => Some(14),
        _ => word.parse().ok(),
    }
}

/// Extract a dose like "500 mg" from "500 milligrams" or "0.5mg".
pub fn parse_dose(text: &str) -> Option<String> {
    let caps = DOSE_RE.captures(text)?;
    let amount = caps.get(1)?.as_str();
    let unit = normalize_unit(caps.get(2)?.as_str());
    Some(format!("{} {}", amount, unit))
}

/// Map spoken frequency phrases to the clinical shorthand (BID, TID, ...).
pub fn parse_frequency(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    for (phrase, shorthand) in FREQUENCY_PHRASES {
        if lowered.contains(phrase) {
            return Some((*shorthand).to_string());
        }
    }
    for (token, shorthand) in FREQUENCY_TOKENS {
        if has_word(&lowered, token) {
            return Some((*shorthand).to_string());
        }
    }
    None
}

/// Extract a duration like "10 days" from "for ten days".
pub fn parse_duration(text: &str) -> Option<String> {
    let caps = DURATION_RE.captures(text)?;
    let n = word_to_number(&caps.get(1)?.as_str().to_lowercase())?;
    let unit = if caps.get(2)?.as_str().to_lowercase().starts_with("day") {
        "day"
    } else {
        "week"
    };
    if n == 1 {
        Some(format!("1 {}", unit))
    } else {
        Some(format!("{} {}s", n, unit))
    }
}

pub fn parse_prn(text: &str) -> bool {
    let lowered = text.to_lowercase();
    has_word(&lowered, "prn") || lowered.contains("as needed") || lowered.contains("when needed")
}

/// Contrast preference.
///
/// "with and without contrast" means a two-phase study and stays
/// unspecified rather than collapsing into `Some(true)`.
pub fn parse_contrast(text: &str) -> Option<bool> {
    let lowered = text.to_lowercase();
    if lowered.contains("with and without") {
        return None;
    }
    if lowered.contains("without contrast")
        || lowered.contains("non-contrast")
        || lowered.contains("non contrast")
        || lowered.contains("noncontrast")
    {
        return Some(false);
    }
    if lowered.contains("with contrast") {
        return Some(true);
    }
    None
}

pub fn parse_laterality(text: &str) -> Option<Laterality> {
    let lowered = text.to_lowercase();
    if has_word(&lowered, "bilateral") || has_word(&lowered, "both") {
        Some(Laterality::Bilateral)
    } else if has_word(&lowered, "left") {
        Some(Laterality::Left)
    } else if has_word(&lowered, "right") {
        Some(Laterality::Right)
    } else {
        None
    }
}

/// Lab orders carry no parsed fields; name and coding identifier come
/// straight from the catalog.
pub fn build_lab_order(lab: &LabTest) -> Order {
    Order::new(
        OrderType::Lab,
        lab.name.clone(),
        lab.name.clone(),
        format!("LOINC {}", lab.loinc_code),
    )
}

pub fn build_imaging_order(text: &str, study: &ImagingStudy) -> Order {
    let contrast = parse_contrast(text);
    let laterality = parse_laterality(text);

    let mut details = format!("CPT {}", study.code);
    match contrast {
        Some(true) => details.push_str(", with contrast"),
        Some(false) => details.push_str(", without contrast"),
        None => {}
    }
    if let Some(side) = laterality {
        details.push_str(&format!(", {}", side));
    }

    let mut order = Order::new(OrderType::Imaging, study.name.clone(), study.name.clone(), details);
    order.contrast = contrast;
    order.laterality = laterality;
    order.body_part = Some(study.body_part.clone());
    order
}

pub fn build_medication_order(text: &str, med: &Medication) -> Order {
    let dose = parse_dose(text).or_else(|| med.common_doses.first().cloned());
    let frequency = parse_frequency(text).or_else(|| med.common_frequencies.first().cloned());
    let duration = parse_duration(text).or_else(|| med.common_durations.first().cloned());
    let prn = parse_prn(text);

    let mut details = String::new();
    if let Some(d) = &dose {
        details.push_str(d);
    }
    if let Some(f) = &frequency {
        if !details.is_empty() {
            details.push(' ');
        }
        details.push_str(f);
    }
    if let Some(d) = &duration {
        if !details.is_empty() {
            details.push(' ');
        }
        details.push_str(&format!("for {}", d));
    }
    if prn {
        if !details.is_empty() {
            details.push(' ');
        }
        details.push_str("PRN");
    }

    let mut order = Order::new(OrderType::Medication, med.name.clone(), med.name.clone(), details);
    order.dose = dose;
    order.frequency = frequency;
    order.duration = duration;
    order.route = Some(med.route.clone());
    order.prn = prn;
    order
}
