//! Extended aggregation mode for long trips
//!
//! The first [`FORECAST_HORIZON_DAYS`] days come from a real forecast. Every
//! later day is synthesized from the monthly climate normals of its calendar
//! month and labeled as an average. Forecast-window days the forecast could
//! not supply (a trip starting past the forecast horizon) fall back to the
//! same monthly average.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::climate::{MonthlyNormal, condition_for_precipitation, normals_years};
use super::codes::describe;
use super::source::{ClimateNormalsSource, DailySource, TierRow};
use super::tier::Tier;
use crate::models::{Coordinates, DataIssue, FetchOutcome, format_optional};

/// Days served from the real forecast before switching to climatology
pub const FORECAST_HORIZON_DAYS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayKind {
    /// Literal forecast values
    Forecast,
    /// Averaged values from monthly climate normals
    MonthlyAverage,
}

/// One day of an extended forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedDay {
    /// 1-based day of the trip
    pub day: u32,
    pub date: NaiveDate,
    pub kind: DayKind,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precipitation: Option<f64>,
    pub condition: String,
}

impl ExtendedDay {
    #[must_use]
    pub fn day_label(&self) -> String {
        format!("Day {}", self.day)
    }

    #[must_use]
    pub fn format_max_temp(&self) -> String {
        self.format_value(self.temp_max, "°C")
    }

    #[must_use]
    pub fn format_min_temp(&self) -> String {
        self.format_value(self.temp_min, "°C")
    }

    /// Averaged values carry an explicit "avg" label
    fn format_value(&self, value: Option<f64>, unit: &str) -> String {
        let formatted = format_optional(value, unit);
        match (self.kind, value) {
            (DayKind::MonthlyAverage, Some(_)) => format!("avg {formatted}"),
            _ => formatted,
        }
    }

    /// One line of the weather block handed to the itinerary prompt
    #[must_use]
    pub fn summary_line(&self) -> String {
        let suffix = match self.kind {
            DayKind::Forecast => "",
            DayKind::MonthlyAverage => " (monthly average)",
        };
        format!(
            "{} ({}): max {} / min {} / condition: {}{}",
            self.day_label(),
            self.date,
            self.format_max_temp(),
            self.format_min_temp(),
            self.condition,
            suffix
        )
    }
}

/// Forecast-then-climatology policy over two collaborators
pub struct ExtendedForecast<S, N> {
    forecast: S,
    normals: N,
    normals_years: u32,
}

impl<S: DailySource, N: ClimateNormalsSource> ExtendedForecast<S, N> {
    pub fn new(forecast: S, normals: N, normals_years: u32) -> Self {
        Self {
            forecast,
            normals,
            normals_years,
        }
    }

    /// Build `days` consecutive days starting at `start`
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    pub async fn build(
        &self,
        coordinates: Coordinates,
        start: NaiveDate,
        days: u32,
    ) -> FetchOutcome<Vec<ExtendedDay>> {
        if days == 0 {
            return FetchOutcome::Success(Vec::new());
        }

        let mut issues = Vec::new();
        let forecast_days = days.min(FORECAST_HORIZON_DAYS);
        let forecast_end = start
            .checked_add_days(Days::new(u64::from(forecast_days - 1)))
            .unwrap_or(start);

        let forecast_rows = match self
            .forecast
            .fetch_daily(Tier::MediumRange, coordinates, start, forecast_end)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Forecast lookup failed: {}", e);
                issues.push(DataIssue::LookupFailure {
                    tier: Tier::MediumRange,
                    message: e.to_string(),
                });
                Vec::new()
            }
        };

        let forecast_complete = start
            .iter_days()
            .take(forecast_days as usize)
            .all(|date| forecast_rows.iter().any(|row| row.date == date));

        let normals = if days > FORECAST_HORIZON_DAYS || !forecast_complete {
            let (first_year, last_year) = normals_years(start, self.normals_years);
            match self
                .normals
                .monthly_normals(coordinates, first_year, last_year)
                .await
            {
                Ok(normals) => Some(normals),
                Err(e) => {
                    warn!("Climate normals lookup failed: {}", e);
                    issues.push(DataIssue::LookupFailure {
                        tier: Tier::Climate,
                        message: e.to_string(),
                    });
                    None
                }
            }
        } else {
            None
        };

        if forecast_rows.is_empty() && normals.is_none() && !issues.is_empty() {
            return FetchOutcome::TotalFailure { issues };
        }

        let (series, gaps) = assemble_extended(start, days, &forecast_rows, normals.as_deref());
        if !gaps.is_empty() {
            issues.push(DataIssue::PartialDataGap { dates: gaps });
        }

        info!("Built {}-day extended forecast ({} issues)", series.len(), issues.len());
        FetchOutcome::from_parts(series, issues)
    }
}

/// Pure assembly of an extended series from forecast rows and monthly normals.
///
/// Returns the series and the dates that had nothing to report.
#[must_use]
pub fn assemble_extended(
    start: NaiveDate,
    days: u32,
    forecast_rows: &[TierRow],
    normals: Option<&[MonthlyNormal]>,
) -> (Vec<ExtendedDay>, Vec<NaiveDate>) {
    let by_date: HashMap<NaiveDate, &TierRow> =
        forecast_rows.iter().map(|row| (row.date, row)).collect();
    let by_month: HashMap<u32, &MonthlyNormal> = normals
        .unwrap_or_default()
        .iter()
        .map(|normal| (normal.month, normal))
        .collect();

    let mut series = Vec::new();
    let mut gaps = Vec::new();

    for (index, date) in start.iter_days().take(days as usize).enumerate() {
        let day = u32::try_from(index).map_or(u32::MAX, |i| i + 1);

        let forecast = if day <= FORECAST_HORIZON_DAYS {
            by_date.get(&date).map(|row| ExtendedDay {
                day,
                date,
                kind: DayKind::Forecast,
                temp_max: row.temp_max,
                temp_min: row.temp_min,
                precipitation: row.precipitation,
                condition: describe(row.weather_code),
            })
        } else {
            None
        };
        let entry = forecast.or_else(|| {
            by_month.get(&date.month()).map(|normal| ExtendedDay {
                day,
                date,
                kind: DayKind::MonthlyAverage,
                temp_max: normal.temp_max,
                temp_min: normal.temp_min,
                precipitation: normal.precipitation,
                condition: condition_for_precipitation(normal.precipitation).to_string(),
            })
        });

        let entry = entry.unwrap_or_else(|| {
            gaps.push(date);
            let kind = if day <= FORECAST_HORIZON_DAYS {
                DayKind::Forecast
            } else {
                DayKind::MonthlyAverage
            };
            ExtendedDay {
                day,
                date,
                kind,
                temp_max: None,
                temp_min: None,
                precipitation: None,
                condition: "unknown".to_string(),
            }
        });
        series.push(entry);
    }

    (series, gaps)
}
