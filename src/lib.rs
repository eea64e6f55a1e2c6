//! `TravelMate` - travel planning from tiered weather data and hotel matching
//!
//! This library provides the weather aggregation (tier merge and the
//! forecast-then-climatology extended mode), hotel candidate resolution
//! (deduplication and distance-penalized ranking) and the collaborators that
//! feed them.

pub mod advice;
pub mod cli;
pub mod config;
pub mod error;
pub mod geocode;
pub mod hotel;
pub mod llm;
pub mod logging;
pub mod models;
pub mod planner;
pub mod weather;

// Re-export core types for public API
pub use config::TravelConfig;
pub use error::TravelError;
pub use hotel::{HotelResolver, resolve_hotel_candidates};
pub use models::{
    Coordinates, DailyWeather, DataIssue, FetchOutcome, HotelCandidate, Location, RankedHotel,
    WeatherSource,
};
pub use weather::{ExtendedForecast, WeatherAggregator, merge_tiers};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelError>;
