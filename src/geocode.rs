//! Place-name resolution
//!
//! Resolves free-text place names to coordinates with the Open-Meteo
//! geocoding search. The first (best) result wins.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::config::WeatherConfig;
use crate::models::Location;
use crate::{Result, TravelError};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `place`, or `TravelError::NotFound`
    async fn geocode(&self, place: &str) -> Result<Location>;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    client: Client,
    url: String,
    language: String,
}

impl OpenMeteoGeocoder {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("TravelMate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.geocoding_url.clone(),
            language: config.geocoding_language.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, place: &str) -> Result<Location> {
        let place = place.trim();
        if place.is_empty() {
            return Err(TravelError::validation("Place name cannot be empty"));
        }

        let url = format!(
            "{}?name={}&count=1&language={}&format=json",
            self.url,
            urlencoding::encode(place),
            urlencoding::encode(&self.language)
        );
        debug!("Geocoding request URL: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TravelError::api(format!(
                "Geocoding request failed with status {status}"
            )));
        }

        let body: openmeteo::GeocodingResponse = response
            .json()
            .await
            .map_err(|e| TravelError::parse(format!("Failed to parse geocoding response: {e}")))?;

        let location: Location = body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| TravelError::not_found(format!("no coordinates for '{place}'")))?;

        info!(
            "Resolved '{}' to {} ({})",
            place,
            location.display_name(),
            location.format_coordinates()
        );
        Ok(location)
    }
}

mod openmeteo {
    use super::Location;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub country: Option<String>,
        pub admin1: Option<String>,
    }

    impl From<GeocodingResult> for Location {
        fn from(result: GeocodingResult) -> Self {
            Location {
                latitude: result.latitude,
                longitude: result.longitude,
                name: result.name,
                country: result.country,
                admin1: result.admin1,
            }
        }
    }
}
