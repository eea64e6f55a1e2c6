//! Daily weather record and display methods

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provenance of a daily record, listed from highest to lowest fidelity
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeatherSource {
    HighFidelityShortRange,
    MediumRangeForecast,
    ClimatologicalAverage,
}

impl WeatherSource {
    /// Short tag used in console output
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            WeatherSource::HighFidelityShortRange => "JMA",
            WeatherSource::MediumRangeForecast => "Forecast",
            WeatherSource::ClimatologicalAverage => "Climate",
        }
    }
}

/// Weather for one calendar date
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyWeather {
    pub date: NaiveDate,
    /// Tier that won this date; `None` when no tier supplied it
    pub source: Option<WeatherSource>,
    /// Maximum temperature in Celsius
    pub temp_max: Option<f64>,
    /// Minimum temperature in Celsius
    pub temp_min: Option<f64>,
    /// Precipitation sum in mm
    pub precipitation: Option<f64>,
    /// Human-readable description of weather conditions
    pub condition: String,
}

impl DailyWeather {
    /// Placeholder for a date no tier could supply
    #[must_use]
    pub fn gap(date: NaiveDate) -> Self {
        Self {
            date,
            source: None,
            temp_max: None,
            temp_min: None,
            precipitation: None,
            condition: "unknown".to_string(),
        }
    }

    #[must_use]
    pub fn is_gap(&self) -> bool {
        self.source.is_none()
    }

    /// Format the temperature range, rendering missing values as "unknown"
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!(
            "max {} / min {}",
            format_optional(self.temp_max, "°C"),
            format_optional(self.temp_min, "°C")
        )
    }

    #[must_use]
    pub fn format_precipitation(&self) -> String {
        format_optional(self.precipitation, "mm")
    }

    /// One console line: date, source tag, condition, temperatures, precipitation
    #[must_use]
    pub fn summary_line(&self) -> String {
        let source = self.source.map_or("none", |s| s.label());
        format!(
            "{} [{}]: {} / {} / precipitation {}",
            self.date,
            source,
            self.condition,
            self.format_temperature(),
            self.format_precipitation()
        )
    }
}

/// Render an optional measurement with one decimal and its unit
#[must_use]
pub fn format_optional(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| format!("{v:.1}{unit}"))
}
