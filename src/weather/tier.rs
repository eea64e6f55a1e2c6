//! Weather tiers and their date-window policies

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::WeatherSource;

/// One weather data source bound to a date-window policy, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// JMA high-resolution model, first 4 days
    ShortRange,
    /// Generic forecast, first 15 days
    MediumRange,
    /// Climate projection, whole range, no weather code
    Climate,
}

impl Tier {
    /// All tiers from highest to lowest fidelity
    pub const ALL: [Tier; 3] = [Tier::ShortRange, Tier::MediumRange, Tier::Climate];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Tier::ShortRange => "short-range",
            Tier::MediumRange => "medium-range",
            Tier::Climate => "climate",
        }
    }

    #[must_use]
    pub fn source(&self) -> WeatherSource {
        match self {
            Tier::ShortRange => WeatherSource::HighFidelityShortRange,
            Tier::MediumRange => WeatherSource::MediumRangeForecast,
            Tier::Climate => WeatherSource::ClimatologicalAverage,
        }
    }

    /// Days past the start date this tier may cover; `None` means unbounded
    #[must_use]
    pub fn horizon_days(&self) -> Option<u64> {
        match self {
            Tier::ShortRange => Some(3),
            Tier::MediumRange => Some(14),
            Tier::Climate => None,
        }
    }

    #[must_use]
    pub fn includes_weather_code(&self) -> bool {
        !matches!(self, Tier::Climate)
    }

    /// Inclusive window this tier is queried for, clamped to `end`
    #[must_use]
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        if end < start {
            return None;
        }
        let window_end = match self.horizon_days() {
            Some(days) => start
                .checked_add_days(Days::new(days))
                .map_or(end, |limit| limit.min(end)),
            None => end,
        };
        Some((start, window_end))
    }
}

/// Every calendar date in `[start, end]`, ascending; empty when `end < start`
#[must_use]
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|date| *date <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case(Tier::ShortRange, "2025-10-20", "2025-10-04")]
    #[case(Tier::MediumRange, "2025-10-20", "2025-10-15")]
    #[case(Tier::Climate, "2025-10-20", "2025-10-20")]
    #[case(Tier::ShortRange, "2025-10-02", "2025-10-02")]
    #[case(Tier::MediumRange, "2025-10-01", "2025-10-01")]
    fn test_window_clamps_to_horizon_and_end(
        #[case] tier: Tier,
        #[case] end: &str,
        #[case] expected_end: &str,
    ) {
        let start = date("2025-10-01");
        assert_eq!(
            tier.window(start, date(end)),
            Some((start, date(expected_end)))
        );
    }

    #[test]
    fn test_window_empty_when_end_before_start() {
        assert_eq!(
            Tier::Climate.window(date("2025-10-05"), date("2025-10-01")),
            None
        );
    }

    #[test]
    fn test_dates_between() {
        let dates = dates_between(date("2025-09-29"), date("2025-10-02"));
        assert_eq!(
            dates,
            vec![
                date("2025-09-29"),
                date("2025-09-30"),
                date("2025-10-01"),
                date("2025-10-02")
            ]
        );
        assert!(dates_between(date("2025-10-02"), date("2025-10-01")).is_empty());
    }

    #[test]
    fn test_tier_metadata() {
        assert!(Tier::ShortRange.includes_weather_code());
        assert!(!Tier::Climate.includes_weather_code());
        assert_eq!(Tier::MediumRange.source(), WeatherSource::MediumRangeForecast);
        assert_eq!(Tier::ALL[0], Tier::ShortRange);
    }
}
