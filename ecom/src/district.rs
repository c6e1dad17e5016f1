use serde::Serialize;
use std::sync::Arc;
use strum_macros::Display;

use crate::{fuzzy::weighted_ratio, gazetteer::Gazetteer};

pub const DEFAULT_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Script {
    Latin,
    Bengali,
}

fn is_bengali_letter_or_digit(c: char) -> bool {
    matches!(c,
        '\u{09E6}'..='\u{09EF}' // digits
        | '\u{0985}'..='\u{0994}' // independent vowels
        | '\u{0995}'..='\u{09B9}' // consonants
    )
}

/// Bengali as soon as one Bengali digit, vowel or consonant appears, Latin otherwise.
pub fn detect_script(text: &str) -> Script {
    if text.chars().any(is_bengali_letter_or_digit) {
        Script::Bengali
    } else {
        Script::Latin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictMatch {
    pub canonical: &'static str,
    pub score: f64,
    /// Position in the gazetteer
    pub index: usize,
    pub script: Script,
}

/// Resolves a free-text address to a gazetteer district.
#[derive(Debug, Clone)]
pub struct DistrictClassifier {
    gazetteer: Arc<Gazetteer>,
    threshold: f64,
}

impl DistrictClassifier {
    pub fn new(gazetteer: Arc<Gazetteer>, threshold: f64) -> Self {
        Self {
            gazetteer,
            threshold,
        }
    }

    pub fn gazetteer(&self) -> &Arc<Gazetteer> {
        &self.gazetteer
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn classify(&self, address: &str) -> Option<&'static str> {
        self.classify_with_threshold(address, self.threshold)
    }

    pub fn classify_with_threshold(&self, address: &str, threshold: f64) -> Option<&'static str> {
        let best = self.best_match(address)?;
        if best.score >= threshold {
            tracing::debug!(district = best.canonical, score = best.score, "Classified address");
            Some(best.canonical)
        } else {
            tracing::debug!(
                candidate = best.canonical,
                score = best.score,
                threshold,
                "No district above threshold"
            );
            None
        }
    }

    /// Highest scoring district for the address's script, whatever its score.
    ///
    /// Candidates are scanned in gazetteer order and only a strictly higher
    /// score replaces the leader, so ties go to the earliest entry.
    pub fn best_match(&self, address: &str) -> Option<DistrictMatch> {
        if address.trim().is_empty() {
            return None;
        }

        let script = detect_script(address);
        let mut best: Option<DistrictMatch> = None;
        for (index, entry) in self.gazetteer.entries().iter().enumerate() {
            let candidate = match script {
                Script::Latin => entry.canonical,
                Script::Bengali => entry.variant,
            };
            let score = weighted_ratio(address, candidate);
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(DistrictMatch {
                    canonical: entry.canonical,
                    score,
                    index,
                    script,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::{GazetteerEntry, bangladesh_districts};

    fn classifier() -> DistrictClassifier {
        DistrictClassifier::new(bangladesh_districts(), DEFAULT_THRESHOLD)
    }

    #[test]
    fn test_detect_script_by_existence() {
        assert_eq!(detect_script("House 5, Road 2"), Script::Latin);
        assert_eq!(detect_script("House 5, Road 2, ঢাকা"), Script::Bengali);
        assert_eq!(detect_script("১২"), Script::Bengali);
        assert_eq!(detect_script(""), Script::Latin);
        // vowel sign alone is not a qualifying character
        assert_eq!(detect_script("\u{09BE}"), Script::Latin);
    }

    #[test]
    fn test_empty_address_is_none() {
        assert_eq!(classifier().classify(""), None);
        assert_eq!(classifier().classify("   "), None);
        assert!(classifier().best_match("").is_none());
    }

    #[test]
    fn test_bengali_exact_name() {
        let best = classifier().best_match("ঢাকা").unwrap();
        assert_eq!(best.canonical, "Dhaka");
        assert_eq!(best.score, 100.0);
        assert_eq!(best.script, Script::Bengali);
    }

    #[test]
    fn test_address_containing_district() {
        assert_eq!(classifier().classify("Mirpur Road, Dhaka"), Some("Dhaka"));
        assert_eq!(classifier().classify("Zindabazar, sylhet"), Some("Sylhet"));
    }

    #[test]
    fn test_threshold_is_inclusive_and_tunable() {
        let c = classifier();
        // partial hit scores exactly 90
        assert_eq!(c.classify_with_threshold("Mirpur Road, Dhaka", 90.0), Some("Dhaka"));
        assert_eq!(c.classify_with_threshold("Mirpur Road, Dhaka", 90.5), None);
    }

    #[test]
    fn test_unrelated_text_is_none() {
        assert_eq!(classifier().classify("1600 Amphitheatre Parkway"), None);
    }

    #[test]
    fn test_ties_go_to_first_entry() {
        let gazetteer = Arc::new(Gazetteer::new(vec![
            GazetteerEntry { canonical: "Alpha", variant: "অ" },
            GazetteerEntry { canonical: "ALPHA", variant: "আ" },
        ]));
        let best = DistrictClassifier::new(gazetteer, 80.0).best_match("alpha").unwrap();
        assert_eq!(best.index, 0);
        assert_eq!(best.canonical, "Alpha");
    }
}
