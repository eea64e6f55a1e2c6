//! Aggregated weather for a place and date range, with per-day outfit advice

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::request::WeatherQuery;
use crate::Result;
use crate::advice::OutfitAdvisor;
use crate::geocode::Geocoder;
use crate::llm::LanguageModel;
use crate::models::{DailyWeather, FetchOutcome, Location};
use crate::weather::{DailySource, WeatherAggregator};

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub location: Location,
    pub query: WeatherQuery,
    pub outcome: FetchOutcome<Vec<DailyWeather>>,
    /// Advice per day of the series, in the same order
    pub advice: Vec<Option<String>>,
}

impl WeatherReport {
    /// Console rendering: a header, then each day with its advice
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!(
            "Weather for {} from {} to {}\n\n",
            self.location.display_name(),
            self.query.start_date,
            self.query.end_date
        );

        let days = self.outcome.data().map_or(&[][..], Vec::as_slice);
        for (index, day) in days.iter().enumerate() {
            out.push_str(&day.summary_line());
            out.push('\n');
            if let Some(Some(advice)) = self.advice.get(index) {
                out.push_str(&format!("  Outfit: {advice}\n"));
            }
            out.push('\n');
        }

        for issue in self.outcome.issues() {
            out.push_str(&format!("Note: {issue}\n"));
        }
        out
    }
}

/// Geocode, aggregate every tier, then ask for advice day by day
#[instrument(skip(geocoder, aggregator, advisor))]
pub async fn weather_report<G, S, M>(
    geocoder: &G,
    aggregator: &WeatherAggregator<S>,
    advisor: Option<&OutfitAdvisor<M>>,
    query: WeatherQuery,
) -> Result<WeatherReport>
where
    G: Geocoder,
    S: DailySource,
    M: LanguageModel,
{
    let location = geocoder.geocode(&query.place).await?;
    let outcome = aggregator
        .aggregate(location.coordinates(), query.start_date, query.end_date)
        .await;
    for issue in outcome.issues() {
        warn!("Weather issue: {}", issue);
    }

    let mut advice = Vec::new();
    if let (Some(advisor), Some(days)) = (advisor, outcome.data()) {
        for day in days {
            advice.push(advisor.advise(day).await);
        }
    }

    info!(
        "Weather report for {} with {} days",
        location.name,
        outcome.data().map_or(0, Vec::len)
    );
    Ok(WeatherReport {
        location,
        query,
        outcome,
        advice,
    })
}
