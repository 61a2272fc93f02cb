//! Substring alias resolution.
//!
//! Maps free text to catalog entries by checking whether any of an
//! entry's aliases appears inside the lower-cased utterance. First entry
//! in declaration order wins; no scoring, no fuzzy matching. This keeps
//! resolution deterministic: the same utterance always resolves the same
//! way. Resolution fails open: an unmatched utterance returns `None`.

use tracing::debug;

use crate::types::{Aliased, Catalog, ImagingStudy, LabTest, Medication, OrderSet};

/// Return the first entry whose alias set contains a substring of `text`.
///
/// Aliases are short canonical phrases; `text` is the full utterance. The
/// match direction is therefore alias-inside-text, never the reverse.
pub fn resolve<'a, T: Aliased>(entries: &'a [T], text: &str) -> Option<&'a T> {
    let lowered = text.to_lowercase();
    entries
        .iter()
        .find(|entry| entry.aliases().iter().any(|alias| lowered.contains(alias.as_str())))
}

impl Catalog {
    pub fn find_lab(&self, text: &str) -> Option<&LabTest> {
        let hit = resolve(&self.labs, text);
        if let Some(lab) = hit {
            debug!("Resolved lab {} from utterance", lab.key);
        }
        hit
    }

    pub fn find_imaging(&self, text: &str) -> Option<&ImagingStudy> {
        let hit = resolve(&self.imaging, text);
        if let Some(study) = hit {
            debug!("Resolved imaging {} from utterance", study.key);
        }
        hit
    }

    pub fn find_medication(&self, text: &str) -> Option<&Medication> {
        let hit = resolve(&self.medications, text);
        if let Some(med) = hit {
            debug!("Resolved medication {} from utterance", med.key);
        }
        hit
    }

    pub fn find_order_set(&self, text: &str) -> Option<&OrderSet> {
        let hit = resolve(&self.order_sets, text);
        if let Some(set) = hit {
            debug!("Resolved order set {} from utterance", set.key);
        }
        hit
    }
}
