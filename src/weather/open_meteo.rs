//! Open-Meteo HTTP client for the daily weather tiers and climate normals
//!
//! No API key is required. Each tier maps to its own endpoint: the JMA model
//! for short range, the generic forecast for medium range, and the climate
//! projection API for the long tail. Monthly normals are derived from the
//! historical archive.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::climate::{MonthlyNormal, monthly_normals_from_daily};
use super::source::{ClimateNormalsSource, DailySource, TierRow};
use super::tier::Tier;
use crate::config::WeatherConfig;
use crate::models::Coordinates;
use crate::{Result, TravelError};

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum";

/// Client for the Open-Meteo forecast, climate and archive APIs
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    config: WeatherConfig,
}

impl OpenMeteoClient {
    /// Create a client with the configured endpoints and timeout
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("TravelMate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, tier: Tier) -> &str {
        match tier {
            Tier::ShortRange => &self.config.short_range_url,
            Tier::MediumRange => &self.config.medium_range_url,
            Tier::Climate => &self.config.climate_url,
        }
    }

    fn daily_url(
        &self,
        base: &str,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
        with_code: bool,
        model: Option<&str>,
    ) -> String {
        let mut daily = DAILY_FIELDS.to_string();
        if with_code {
            daily.push_str(",weathercode");
        }
        let mut url = format!(
            "{base}?latitude={}&longitude={}&daily={daily}&timezone={}&start_date={}&end_date={}",
            coordinates.latitude,
            coordinates.longitude,
            urlencoding::encode(&self.config.timezone),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );
        if let Some(model) = model {
            url.push_str("&models=");
            url.push_str(&urlencoding::encode(model));
        }
        url
    }

    async fn get_daily(&self, url: &str) -> Result<Vec<TierRow>> {
        debug!("Open-Meteo request URL: {}", url);
        let start_time = Instant::now();

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<openmeteo::ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.reason)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(TravelError::api(format!(
                "Open-Meteo request failed with status {status}: {reason}"
            )));
        }

        let body: openmeteo::DailyResponse = response
            .json()
            .await
            .map_err(|e| TravelError::parse(format!("Failed to parse Open-Meteo response: {e}")))?;

        let rows = body.daily.map(openmeteo::DailyData::into_rows).unwrap_or_default();

        let duration = start_time.elapsed();
        if duration.as_secs() > 5 {
            warn!("Slow Open-Meteo response: {:.3}s", duration.as_secs_f64());
        }
        Ok(rows)
    }
}

#[async_trait]
impl DailySource for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn fetch_daily(
        &self,
        tier: Tier,
        coordinates: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TierRow>> {
        let model = match tier {
            Tier::Climate => self.config.climate_model.as_deref(),
            _ => None,
        };
        let url = self.daily_url(
            self.endpoint(tier),
            coordinates,
            start,
            end,
            tier.includes_weather_code(),
            model,
        );

        let rows = self.get_daily(&url).await?;
        info!("{} tier returned {} days", tier.name(), rows.len());
        Ok(rows)
    }
}

#[async_trait]
impl ClimateNormalsSource for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn monthly_normals(
        &self,
        coordinates: Coordinates,
        first_year: i32,
        last_year: i32,
    ) -> Result<Vec<MonthlyNormal>> {
        let start = NaiveDate::from_ymd_opt(first_year, 1, 1)
            .ok_or_else(|| TravelError::validation(format!("Invalid year: {first_year}")))?;
        let end = NaiveDate::from_ymd_opt(last_year, 12, 31)
            .ok_or_else(|| TravelError::validation(format!("Invalid year: {last_year}")))?;

        let url = self.daily_url(&self.config.archive_url, coordinates, start, end, false, None);
        let rows = self.get_daily(&url).await?;
        if rows.is_empty() {
            return Err(TravelError::not_found(format!(
                "no archive data for {first_year}-{last_year}"
            )));
        }

        info!(
            "Computing monthly normals from {} archived days ({first_year}-{last_year})",
            rows.len()
        );
        Ok(monthly_normals_from_daily(&rows))
    }
}

/// `OpenMeteo` API response structures and conversion utilities
mod openmeteo {
    use super::TierRow;
    use chrono::NaiveDate;
    use serde::Deserialize;
    use tracing::warn;

    /// Daily response from the forecast, climate and archive APIs
    #[derive(Debug, Deserialize)]
    pub struct DailyResponse {
        pub daily: Option<DailyData>,
    }

    /// Error body returned with HTTP 400
    #[derive(Debug, Deserialize)]
    pub struct ErrorResponse {
        pub reason: Option<String>,
    }

    /// Daily weather data from `OpenMeteo`
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m_max")]
        pub temperature_max: Option<Vec<Option<f64>>>,
        #[serde(rename = "temperature_2m_min")]
        pub temperature_min: Option<Vec<Option<f64>>>,
        #[serde(rename = "precipitation_sum")]
        pub precipitation: Option<Vec<Option<f64>>>,
        #[serde(rename = "weathercode")]
        pub weather_code: Option<Vec<Option<f64>>>,
    }

    fn value_at(values: Option<&Vec<Option<f64>>>, index: usize) -> Option<f64> {
        values.and_then(|v| v.get(index).copied().flatten())
    }

    impl DailyData {
        /// Convert the column arrays into rows, skipping unparsable dates
        pub fn into_rows(self) -> Vec<TierRow> {
            self.time
                .iter()
                .enumerate()
                .filter_map(|(i, time)| {
                    let Ok(date) = NaiveDate::parse_from_str(time, "%Y-%m-%d") else {
                        warn!("Skipping row with invalid date '{}'", time);
                        return None;
                    };
                    #[allow(clippy::cast_possible_truncation)]
                    let weather_code =
                        value_at(self.weather_code.as_ref(), i).map(|code| code.round() as i64);
                    Some(TierRow {
                        date,
                        temp_max: value_at(self.temperature_max.as_ref(), i),
                        temp_min: value_at(self.temperature_min.as_ref(), i),
                        precipitation: value_at(self.precipitation.as_ref(), i),
                        weather_code,
                    })
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        let base = server.uri();
        let config = WeatherConfig {
            short_range_url: format!("{base}/v1/jma"),
            medium_range_url: format!("{base}/v1/forecast"),
            climate_url: format!("{base}/v1/climate"),
            archive_url: format!("{base}/v1/archive"),
            timezone: "Asia/Tokyo".to_string(),
            climate_model: Some("MRI_AGCM3_2_S".to_string()),
            ..WeatherConfig::default()
        };
        OpenMeteoClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_short_range_request_and_parse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/jma"))
            .and(query_param("daily", "temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode"))
            .and(query_param("timezone", "Asia/Tokyo"))
            .and(query_param("start_date", "2025-10-01"))
            .and(query_param("end_date", "2025-10-02"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2025-10-01", "2025-10-02"],
                    "temperature_2m_max": [24.1, null],
                    "temperature_2m_min": [17.9, 16.0],
                    "precipitation_sum": [0.0, 3.2],
                    "weathercode": [2, 61]
                }
            })))
            .mount(&server)
            .await;

        let rows = client_for(&server)
            .fetch_daily(
                Tier::ShortRange,
                Coordinates::new(35.6895, 139.6917),
                date("2025-10-01"),
                date("2025-10-02"),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].temp_max, Some(24.1));
        assert_eq!(rows[0].weather_code, Some(2));
        assert_eq!(rows[1].temp_max, None);
        assert_eq!(rows[1].precipitation, Some(3.2));
    }

    #[tokio::test]
    async fn test_climate_request_has_no_code_and_sends_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/climate"))
            .and(query_param("daily", "temperature_2m_max,temperature_2m_min,precipitation_sum"))
            .and(query_param("models", "MRI_AGCM3_2_S"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2025-11-01"],
                    "temperature_2m_max": [15.0],
                    "temperature_2m_min": [8.0],
                    "precipitation_sum": [1.0]
                }
            })))
            .mount(&server)
            .await;

        let rows = client_for(&server)
            .fetch_daily(
                Tier::Climate,
                Coordinates::new(35.6895, 139.6917),
                date("2025-11-01"),
                date("2025-11-01"),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weather_code, None);
    }

    #[tokio::test]
    async fn test_error_status_carries_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": true,
                "reason": "Parameter 'start_date' is out of allowed range"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_daily(
                Tier::MediumRange,
                Coordinates::new(35.6895, 139.6917),
                date("2030-01-01"),
                date("2030-01-02"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TravelError::Api { .. }));
        assert!(err.to_string().contains("out of allowed range"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_daily(
                Tier::MediumRange,
                Coordinates::new(35.6895, 139.6917),
                date("2025-10-01"),
                date("2025-10-02"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TravelError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_monthly_normals_from_archive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .and(query_param("start_date", "2023-01-01"))
            .and(query_param("end_date", "2024-12-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2023-10-01", "2023-10-02", "2024-10-01"],
                    "temperature_2m_max": [22.0, 24.0, 26.0],
                    "temperature_2m_min": [15.0, 15.0, 18.0],
                    "precipitation_sum": [100.0, 20.0, 40.0]
                }
            })))
            .mount(&server)
            .await;

        let normals = client_for(&server)
            .monthly_normals(Coordinates::new(35.6895, 139.6917), 2023, 2024)
            .await
            .unwrap();

        let october = &normals[9];
        assert_eq!(october.month, 10);
        assert_eq!(october.temp_max, Some(24.0));
        assert_eq!(october.temp_min, Some(16.0));
        assert_eq!(october.precipitation, Some(80.0));
    }

    #[test]
    fn test_out_of_range_code_is_kept_verbatim() {
        let daily: openmeteo::DailyData = serde_json::from_value(json!({
            "time": ["2025-10-01", "2025-10-02"],
            "weathercode": [70000, -3]
        }))
        .unwrap();

        let rows = daily.into_rows();
        assert_eq!(rows[0].weather_code, Some(70000));
        assert_eq!(
            crate::weather::codes::describe(rows[0].weather_code),
            "unknown (code: 70000)"
        );
        assert_eq!(rows[1].weather_code, Some(-3));
    }
}
