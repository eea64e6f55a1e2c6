//! Greedy deduplication of fuzzy-matched hotel candidates
//!
//! Candidates are processed in input order against an accumulating list of
//! accepted representatives. A candidate is dropped when its normalized name
//! is similar enough to an accepted one AND both coordinate deltas are below
//! the coordinate threshold.
//!
//! Comparison only happens against accepted representatives, never against
//! dropped candidates. With A~B, B~C and not A~C, B merges into A while C
//! stays on its own. The result therefore depends on input order.

use crate::models::HotelCandidate;

/// Thresholds for the duplicate test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupThresholds {
    /// Minimum normalized-name similarity in [0, 1]
    pub name: f64,
    /// Maximum latitude and longitude difference in degrees (exclusive)
    pub coordinate: f64,
}

impl Default for DedupThresholds {
    fn default() -> Self {
        Self {
            name: 0.85,
            coordinate: 0.01,
        }
    }
}

/// Lowercase and strip ASCII and full-width (U+3000) spaces
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ' && *c != '\u{3000}')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Edit-distance similarity of two normalized names in [0, 1]
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize_name(a), &normalize_name(b))
}

/// Whether `candidate` duplicates the already accepted `accepted`
#[must_use]
pub fn is_duplicate(
    candidate: &HotelCandidate,
    accepted: &HotelCandidate,
    thresholds: DedupThresholds,
) -> bool {
    name_similarity(&candidate.name, &accepted.name) >= thresholds.name
        && (candidate.lat - accepted.lat).abs() < thresholds.coordinate
        && (candidate.lon - accepted.lon).abs() < thresholds.coordinate
}

/// Keep the first candidate of every duplicate cluster, preserving order
#[must_use]
pub fn deduplicate(
    candidates: Vec<HotelCandidate>,
    thresholds: DedupThresholds,
) -> Vec<HotelCandidate> {
    let mut unique: Vec<HotelCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let duplicate = unique
            .iter()
            .any(|accepted| is_duplicate(&candidate, accepted, thresholds));
        if duplicate {
            tracing::debug!("Dropping duplicate hotel candidate '{}'", candidate.name);
        } else {
            unique.push(candidate);
        }
    }
    unique
}
