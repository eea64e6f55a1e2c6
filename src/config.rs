//! Configuration management for `TravelMate`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TravelError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TravelMate` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Open-Meteo endpoints and request settings
    pub weather: WeatherConfig,
    /// Language-model endpoint and credentials
    pub llm: LlmConfig,
    /// Hotel matching and ranking thresholds
    pub hotel: HotelConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Trip defaults used when the request leaves them out
    pub defaults: DefaultsConfig,
}

/// Weather and geocoding API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// High-fidelity short-range model (JMA)
    pub short_range_url: String,
    /// Generic medium-range forecast
    pub medium_range_url: String,
    /// Long-range climate projection
    pub climate_url: String,
    /// Historical archive used for monthly normals
    pub archive_url: String,
    /// Place-name search
    pub geocoding_url: String,
    /// Language of geocoding results
    pub geocoding_language: String,
    /// IANA timezone for daily aggregation, or "auto"
    pub timezone: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Climate model passed to the climate API, if any
    pub climate_model: Option<String>,
    /// Past whole years averaged into monthly normals
    pub normals_years: u32,
}

/// Chat-completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,
    pub model: String,
    /// Falls back to `OPENAI_API_KEY` when unset
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Language the model should answer in
    pub language: String,
}

/// Hotel candidate thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelConfig {
    /// Minimum match score for a candidate to be considered
    pub match_threshold: f64,
    /// Minimum name similarity for two candidates to be duplicates
    pub name_threshold: f64,
    /// Coordinate delta in degrees below which candidates may be duplicates
    pub coordinate_threshold: f64,
    /// Kilometers per point of score penalty
    pub distance_divisor: f64,
    /// Maximum candidates requested from the matcher
    pub candidate_limit: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Default trip settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Trip length when the request does not say
    pub trip_days: u32,
    pub arrival_time: String,
    pub departure_time: String,
    /// Number of tourist spots requested for the itinerary
    pub spot_limit: u32,
}

// Default value functions
fn default_short_range_url() -> String {
    "https://api.open-meteo.com/v1/jma".to_string()
}

fn default_medium_range_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_climate_url() -> String {
    "https://climate-api.open-meteo.com/v1/climate".to_string()
}

fn default_archive_url() -> String {
    "https://archive-api.open-meteo.com/v1/archive".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_geocoding_language() -> String {
    "en".to_string()
}

fn default_timezone() -> String {
    "auto".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_normals_years() -> u32 {
    10
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_llm_language() -> String {
    "English".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_trip_days() -> u32 {
    7
}

fn default_arrival_time() -> String {
    "day 1 14:00".to_string()
}

fn default_departure_time() -> String {
    "last day 12:00".to_string()
}

fn default_spot_limit() -> u32 {
    12
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            short_range_url: default_short_range_url(),
            medium_range_url: default_medium_range_url(),
            climate_url: default_climate_url(),
            archive_url: default_archive_url(),
            geocoding_url: default_geocoding_url(),
            geocoding_language: default_geocoding_language(),
            timezone: default_timezone(),
            timeout_seconds: default_weather_timeout(),
            climate_model: None,
            normals_years: default_normals_years(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_seconds: default_llm_timeout(),
            language: default_llm_language(),
        }
    }
}

impl Default for HotelConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
            name_threshold: 0.85,
            coordinate_threshold: 0.01,
            distance_divisor: 20.0,
            candidate_limit: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            trip_days: default_trip_days(),
            arrival_time: default_arrival_time(),
            departure_time: default_departure_time(),
            spot_limit: default_spot_limit(),
        }
    }
}

impl TravelConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let explicit = config_path.is_some();
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if explicit && !config_file.exists() {
            return Err(TravelError::config(format!(
                "Config file not found: {}",
                config_file.display()
            ))
            .into());
        }

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRAVELMATE_WEATHER__TIMEZONE=Asia/Tokyo
        builder = builder.add_source(
            Environment::with_prefix("TRAVELMATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TravelConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travelmate").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        let weather = &mut self.weather;
        if weather.short_range_url.is_empty() {
            weather.short_range_url = default_short_range_url();
        }
        if weather.medium_range_url.is_empty() {
            weather.medium_range_url = default_medium_range_url();
        }
        if weather.climate_url.is_empty() {
            weather.climate_url = default_climate_url();
        }
        if weather.archive_url.is_empty() {
            weather.archive_url = default_archive_url();
        }
        if weather.geocoding_url.is_empty() {
            weather.geocoding_url = default_geocoding_url();
        }
        if weather.geocoding_language.is_empty() {
            weather.geocoding_language = default_geocoding_language();
        }
        if weather.timezone.is_empty() {
            weather.timezone = default_timezone();
        }
        if weather.timeout_seconds == 0 {
            weather.timeout_seconds = default_weather_timeout();
        }
        if weather.normals_years == 0 {
            weather.normals_years = default_normals_years();
        }
        if weather.climate_model.as_deref().is_some_and(str::is_empty) {
            weather.climate_model = None;
        }

        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.llm.language.is_empty() {
            self.llm.language = default_llm_language();
        }
        if self.llm.api_key.as_deref().is_some_and(str::is_empty) {
            self.llm.api_key = None;
        }

        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }

        if self.defaults.trip_days == 0 {
            self.defaults.trip_days = default_trip_days();
        }
        if self.defaults.arrival_time.is_empty() {
            self.defaults.arrival_time = default_arrival_time();
        }
        if self.defaults.departure_time.is_empty() {
            self.defaults.departure_time = default_departure_time();
        }
        if self.defaults.spot_limit == 0 {
            self.defaults.spot_limit = default_spot_limit();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_thresholds()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(TravelError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.llm.timeout_seconds > 300 {
            return Err(TravelError::config("LLM API timeout cannot exceed 300 seconds").into());
        }

        if self.weather.normals_years > 50 {
            return Err(TravelError::config("Climate normals cannot span more than 50 years").into());
        }

        if self.defaults.trip_days > 60 {
            return Err(TravelError::config("Default trip length cannot exceed 60 days").into());
        }

        if self.hotel.candidate_limit == 0 || self.hotel.candidate_limit > 20 {
            return Err(TravelError::config("Hotel candidate limit must be between 1 and 20").into());
        }

        Ok(())
    }

    /// Validate hotel thresholds
    fn validate_thresholds(&self) -> Result<()> {
        for (name, value) in [
            ("match_threshold", self.hotel.match_threshold),
            ("name_threshold", self.hotel.name_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TravelError::config(format!(
                    "Hotel {name} must be between 0 and 1, got {value}"
                ))
                .into());
            }
        }

        if self.hotel.coordinate_threshold.is_nan() || self.hotel.coordinate_threshold <= 0.0 {
            return Err(TravelError::config("Hotel coordinate threshold must be positive").into());
        }

        if self.hotel.distance_divisor.is_nan() || self.hotel.distance_divisor <= 0.0 {
            return Err(TravelError::config("Hotel distance divisor must be positive").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("weather.short_range_url", &self.weather.short_range_url),
            ("weather.medium_range_url", &self.weather.medium_range_url),
            ("weather.climate_url", &self.weather.climate_url),
            ("weather.archive_url", &self.weather.archive_url),
            ("weather.geocoding_url", &self.weather.geocoding_url),
            ("llm.base_url", &self.llm.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
