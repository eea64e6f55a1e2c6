//! Weather aggregation
//!
//! - `tier`: the three data tiers and their date windows
//! - `merge`: pure tier-priority merge into one daily series
//! - `aggregator`: queries every tier and reports partial failures
//! - `extended`: forecast for the first days, monthly climatology after
//! - `open_meteo`: HTTP implementation of the data sources

pub mod aggregator;
pub mod climate;
pub mod codes;
pub mod extended;
pub mod merge;
pub mod open_meteo;
pub mod source;
pub mod tier;

pub use aggregator::WeatherAggregator;
pub use climate::MonthlyNormal;
pub use codes::weather_code_to_description;
pub use extended::{DayKind, ExtendedDay, ExtendedForecast};
pub use merge::{MergedSeries, TierContribution, merge_tiers};
pub use open_meteo::OpenMeteoClient;
pub use source::{ClimateNormalsSource, DailySource, TierRow};
pub use tier::Tier;
