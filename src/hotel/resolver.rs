//! Candidate resolution: match filtering, deduplication, ranking

use tracing::{debug, info};

use super::dedup::{DedupThresholds, deduplicate};
use super::rank::{DEFAULT_DISTANCE_DIVISOR, rank_candidates};
use crate::config::HotelConfig;
use crate::models::{HotelCandidate, RankedHotel};

/// Configurable resolver over raw fuzzy-match output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotelResolver {
    /// Candidates scoring below this are dropped before deduplication
    pub match_threshold: f64,
    pub dedup: DedupThresholds,
    /// Kilometers per point of score penalty
    pub distance_divisor: f64,
}

impl Default for HotelResolver {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
            dedup: DedupThresholds::default(),
            distance_divisor: DEFAULT_DISTANCE_DIVISOR,
        }
    }
}

impl From<&HotelConfig> for HotelResolver {
    fn from(config: &HotelConfig) -> Self {
        Self {
            match_threshold: config.match_threshold,
            dedup: DedupThresholds {
                name: config.name_threshold,
                coordinate: config.coordinate_threshold,
            },
            distance_divisor: config.distance_divisor,
        }
    }
}

impl HotelResolver {
    /// Filter, deduplicate and rank. An empty result means nothing matched.
    #[must_use]
    pub fn resolve(&self, raw: Vec<HotelCandidate>) -> Vec<RankedHotel> {
        let total = raw.len();
        let matched: Vec<HotelCandidate> = raw
            .into_iter()
            .filter(|c| c.match_score >= self.match_threshold)
            .collect();
        debug!(
            "{} of {} candidates pass match threshold {}",
            matched.len(),
            total,
            self.match_threshold
        );

        let unique = deduplicate(matched, self.dedup);
        let ranked = rank_candidates(unique, self.distance_divisor);
        info!("Resolved {} hotel candidates from {} raw", ranked.len(), total);
        ranked
    }
}

/// Deduplicate and rank with the default match threshold and divisor
#[must_use]
pub fn resolve_hotel_candidates(
    raw: Vec<HotelCandidate>,
    name_threshold: f64,
    coord_threshold: f64,
) -> Vec<RankedHotel> {
    HotelResolver {
        dedup: DedupThresholds {
            name: name_threshold,
            coordinate: coord_threshold,
        },
        ..HotelResolver::default()
    }
    .resolve(raw)
}
