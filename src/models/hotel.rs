//! Hotel candidate models

use serde::{Deserialize, Deserializer, Serialize};

use super::Coordinates;

/// Treat an explicit `null` like a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A hotel suggestion as returned by the fuzzy matcher
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HotelCandidate {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    /// Caller-supplied similarity estimate in [0, 1]
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_score: f64,
}

impl HotelCandidate {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// A deduplicated candidate annotated with its ranking inputs
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RankedHotel {
    #[serde(flatten)]
    pub candidate: HotelCandidate,
    /// Distance to the reference candidate, rounded to 2 decimals
    pub distance_km: f64,
    /// `match_score - distance_km / divisor`, rounded to 3 decimals
    pub final_score: f64,
}

impl RankedHotel {
    /// One console line for the selection menu
    #[must_use]
    pub fn menu_line(&self) -> String {
        format!(
            "{} - {} (score: {}, dist: {}km, final: {})",
            self.candidate.name,
            self.candidate.address,
            self.candidate.match_score,
            self.distance_km,
            self.final_score
        )
    }
}
