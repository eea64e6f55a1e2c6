//! Data models for the TravelMate application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and geocoding results
//! - Weather: Daily weather records and their provenance
//! - Hotel: Hotel candidates before and after ranking
//! - Outcome: Success / partial / total failure results

pub mod hotel;
pub mod location;
pub mod outcome;
pub mod weather;

// Re-export all public types for convenient access
pub use hotel::{HotelCandidate, RankedHotel};
pub use location::{Coordinates, Location};
pub use outcome::{DataIssue, FetchOutcome};
pub use weather::{DailyWeather, WeatherSource, format_optional};
