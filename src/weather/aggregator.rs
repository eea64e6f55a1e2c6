//! Multi-tier weather aggregation
//!
//! Queries the short-range, medium-range and climate tiers one after another
//! and merges whatever they return into one contiguous daily series. A tier
//! that fails only loses its own contribution.

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use super::merge::{TierContribution, merge_tiers};
use super::source::DailySource;
use super::tier::Tier;
use crate::models::{Coordinates, DailyWeather, DataIssue, FetchOutcome};

/// Service combining every tier of a [`DailySource`]
pub struct WeatherAggregator<S> {
    source: S,
}

impl<S: DailySource> WeatherAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Build one record per date of `[start, end]`, best tier first.
    ///
    /// `end < start` yields an empty `Success` without any query.
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    pub async fn aggregate(
        &self,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchOutcome<Vec<DailyWeather>> {
        if end < start {
            info!("Requested range {start}..{end} is empty");
            return FetchOutcome::Success(Vec::new());
        }

        let mut contributions = Vec::new();
        let mut issues = Vec::new();

        for tier in Tier::ALL {
            let Some((from, to)) = tier.window(start, end) else {
                continue;
            };
            debug!("Querying {} tier for {from}..={to}", tier.name());

            match self.source.fetch_daily(tier, coordinates, from, to).await {
                Ok(rows) if rows.is_empty() => {
                    warn!("{} tier returned no data", tier.name());
                    issues.push(DataIssue::LookupFailure {
                        tier,
                        message: "no data returned".to_string(),
                    });
                }
                Ok(rows) => {
                    debug!("{} tier returned {} rows", tier.name(), rows.len());
                    contributions.push(TierContribution { tier, rows });
                }
                Err(e) => {
                    warn!("{} tier failed: {}", tier.name(), e);
                    issues.push(DataIssue::LookupFailure {
                        tier,
                        message: e.to_string(),
                    });
                }
            }
        }

        if contributions.is_empty() {
            warn!("Every weather tier failed for {start}..={end}");
            return FetchOutcome::TotalFailure { issues };
        }

        let merged = merge_tiers(start, end, &contributions);
        if !merged.gaps.is_empty() {
            warn!("{} dates have no weather data", merged.gaps.len());
            issues.push(DataIssue::PartialDataGap {
                dates: merged.gaps,
            });
        }

        info!(
            "Aggregated {} days of weather ({} issues)",
            merged.days.len(),
            issues.len()
        );
        FetchOutcome::from_parts(merged.days, issues)
    }
}
