//! Distance-penalized ranking of deduplicated candidates

use crate::models::{HotelCandidate, RankedHotel};

/// Default kilometers per point of score penalty
pub const DEFAULT_DISTANCE_DIVISOR: f64 = 20.0;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `match_score - distance_km / divisor`, before rounding
#[must_use]
pub fn final_score(match_score: f64, distance_km: f64, divisor: f64) -> f64 {
    match_score - distance_km / divisor
}

/// Rank candidates by distance to the first one.
///
/// The first candidate is the reference point and always gets distance 0.
/// The sort is stable, so equal scores keep input order.
#[must_use]
pub fn rank_candidates(candidates: Vec<HotelCandidate>, divisor: f64) -> Vec<RankedHotel> {
    let Some(reference) = candidates.first().map(HotelCandidate::coordinates) else {
        return Vec::new();
    };

    let mut ranked: Vec<RankedHotel> = candidates
        .into_iter()
        .map(|candidate| {
            let distance = reference.distance_km(&candidate.coordinates());
            let score = final_score(candidate.match_score, distance, divisor);
            RankedHotel {
                candidate,
                distance_km: round_to(distance, 2),
                final_score: round_to(score, 3),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    ranked
}
