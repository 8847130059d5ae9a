//! Location standardization.

use std::sync::Arc;

use regex::Regex;

use super::spelling::Speller;

/// Fallback returned for anything that cannot be classified.
pub const UNCLASSIFIED: &str = "customized address";

/// Classifies author-supplied location strings into a standardized form.
///
/// Entirely offline: the input is spell-corrected, then tested against a
/// fixed ordered pattern set anchored at the start of the string. The first
/// match wins and its corrected form is returned verbatim; everything else
/// falls back to the [`UNCLASSIFIED`] sentinel. No geocoding lookup is
/// performed, trading precision for determinism and speed.
pub struct LocationClassifier {
    patterns: Vec<Regex>,
    speller: Arc<dyn Speller>,
}

impl LocationClassifier {
    pub fn new(speller: Arc<dyn Speller>) -> Self {
        let patterns = vec![
            // City, region-or-country ("San Francisco, CA" style tail).
            Regex::new(r"^[a-zA-Z]+, [a-zA-Z]{2,}\b").unwrap(),
            // City followed by a region/country token, no comma.
            Regex::new(r"^[a-zA-Z]+ [a-zA-Z]{2,}\b").unwrap(),
        ];
        Self { patterns, speller }
    }

    /// Standardize one raw location value.
    pub fn classify(&self, raw: Option<&str>) -> String {
        let raw = match raw {
            Some(s) if !s.trim().is_empty() => s,
            _ => return UNCLASSIFIED.to_string(),
        };

        let corrected = self.speller.correct(raw);

        for pattern in &self.patterns {
            if pattern.is_match(&corrected) {
                return corrected;
            }
        }

        UNCLASSIFIED.to_string()
    }
}
