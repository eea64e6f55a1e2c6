//! End-to-end tests against mocked Open-Meteo endpoints

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use travelmate::advice::OutfitAdvisor;
use travelmate::config::{LlmConfig, WeatherConfig};
use travelmate::geocode::OpenMeteoGeocoder;
use travelmate::llm::OpenAiClient;
use travelmate::planner::{ToolOutput, run_weather_tools};
use travelmate::weather::{DayKind, ExtendedForecast, OpenMeteoClient, Tier, WeatherAggregator};
use travelmate::{
    Coordinates, DataIssue, FetchOutcome, HotelCandidate, WeatherSource, resolve_hotel_candidates,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tokyo() -> Coordinates {
    Coordinates::new(35.6895, 139.6917)
}

fn client_for(server: &MockServer) -> OpenMeteoClient {
    let base = server.uri();
    OpenMeteoClient::new(WeatherConfig {
        short_range_url: format!("{base}/v1/jma"),
        medium_range_url: format!("{base}/v1/forecast"),
        climate_url: format!("{base}/v1/climate"),
        archive_url: format!("{base}/v1/archive"),
        ..WeatherConfig::default()
    })
    .unwrap()
}

fn llm_for(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(&LlmConfig {
        base_url: format!("{}/v1", server.uri()),
        api_key: Some("sk-test".to_string()),
        ..LlmConfig::default()
    })
    .unwrap()
}

async fn mount_daily(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_three_tiers_merge_into_one_series() {
    let server = MockServer::start().await;
    mount_daily(
        &server,
        "/v1/jma",
        json!({"daily": {
            "time": ["2025-10-01", "2025-10-02"],
            "temperature_2m_max": [25.0, null],
            "temperature_2m_min": [18.0, 17.0],
            "precipitation_sum": [0.0, 0.0],
            "weathercode": [0, 1]
        }}),
    )
    .await;
    mount_daily(
        &server,
        "/v1/forecast",
        json!({"daily": {
            "time": ["2025-10-01", "2025-10-02", "2025-10-03"],
            "temperature_2m_max": [99.0, 23.0, 22.0],
            "temperature_2m_min": [99.0, 16.0, 15.0],
            "precipitation_sum": [9.0, 1.0, 2.0],
            "weathercode": [95, 3, 63]
        }}),
    )
    .await;
    mount_daily(
        &server,
        "/v1/climate",
        json!({"daily": {
            "time": ["2025-10-01", "2025-10-02", "2025-10-03", "2025-10-04"],
            "temperature_2m_max": [20.0, 20.0, 20.0, 21.0],
            "temperature_2m_min": [12.0, 12.0, 12.0, 13.0],
            "precipitation_sum": [3.0, 3.0, 3.0, 4.0]
        }}),
    )
    .await;

    let aggregator = WeatherAggregator::new(client_for(&server));
    let outcome = aggregator.aggregate(tokyo(), date("2025-10-01"), date("2025-10-04")).await;

    assert!(outcome.is_success(), "issues: {:?}", outcome.issues());
    let days = outcome.into_data().unwrap();
    let summary: Vec<(Option<WeatherSource>, Option<f64>, &str)> = days
        .iter()
        .map(|d| (d.source, d.temp_max, d.condition.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Some(WeatherSource::HighFidelityShortRange), Some(25.0), "clear sky"),
            // Null max from the short range lets the forecast replace it
            (Some(WeatherSource::MediumRangeForecast), Some(23.0), "overcast"),
            (Some(WeatherSource::MediumRangeForecast), Some(22.0), "moderate rain"),
            (
                Some(WeatherSource::ClimatologicalAverage),
                Some(21.0),
                "long-term trend only (no weather code)"
            ),
        ]
    );
}

#[tokio::test]
async fn test_failing_tier_degrades_to_partial_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/jma"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_daily(
        &server,
        "/v1/forecast",
        json!({"daily": {
            "time": ["2025-10-01"],
            "temperature_2m_max": [23.0],
            "temperature_2m_min": [16.0],
            "precipitation_sum": [0.5],
            "weathercode": [2]
        }}),
    )
    .await;
    mount_daily(&server, "/v1/climate", json!({"daily": {"time": []}})).await;

    let aggregator = WeatherAggregator::new(client_for(&server));
    let outcome = aggregator.aggregate(tokyo(), date("2025-10-01"), date("2025-10-02")).await;

    let FetchOutcome::PartialFailure { data, issues } = outcome else {
        panic!("expected partial failure");
    };
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].condition, "partly cloudy");
    assert!(data[1].is_gap());
    assert!(issues.contains(&DataIssue::PartialDataGap {
        dates: vec![date("2025-10-02")]
    }));
    assert!(issues.iter().any(|issue| matches!(
        issue,
        DataIssue::LookupFailure { tier: Tier::ShortRange, .. }
    )));
}

#[tokio::test]
async fn test_extended_mode_switches_after_five_days() {
    let server = MockServer::start().await;
    mount_daily(
        &server,
        "/v1/forecast",
        json!({"daily": {
            "time": ["2025-10-01", "2025-10-02", "2025-10-03", "2025-10-04", "2025-10-05"],
            "temperature_2m_max": [24.0, 24.0, 24.0, 24.0, 24.0],
            "temperature_2m_min": [17.0, 17.0, 17.0, 17.0, 17.0],
            "precipitation_sum": [0.0, 0.0, 0.0, 0.0, 0.0],
            "weathercode": [1, 1, 1, 1, 1]
        }}),
    )
    .await;
    mount_daily(
        &server,
        "/v1/archive",
        json!({"daily": {
            "time": ["2023-10-01", "2023-10-02", "2024-10-01"],
            "temperature_2m_max": [22.0, 24.0, 26.0],
            "temperature_2m_min": [14.0, 16.0, 18.0],
            "precipitation_sum": [100.0, 80.0, 170.0]
        }}),
    )
    .await;

    let client = client_for(&server);
    let extended = ExtendedForecast::new(client.clone(), client, 2);
    let outcome = extended.build(tokyo(), date("2025-10-01"), 10).await;

    assert!(outcome.is_success(), "issues: {:?}", outcome.issues());
    let days = outcome.into_data().unwrap();
    assert_eq!(days.len(), 10);
    assert!(days[..5].iter().all(|d| d.kind == DayKind::Forecast));
    assert_eq!(days[0].condition, "mainly clear");

    let day_six = &days[5];
    assert_eq!(day_six.kind, DayKind::MonthlyAverage);
    assert_eq!(day_six.format_max_temp(), "avg 24.0°C");
    // October totals: 180 mm in 2023, 170 mm in 2024
    assert_eq!(day_six.condition, "frequently rainy");
}

#[test]
fn test_hotel_resolution_end_to_end() {
    let raw = vec![
        HotelCandidate {
            name: "Grand Hotel Tokyo".to_string(),
            address: "Chiyoda".to_string(),
            lat: 35.68,
            lon: 139.76,
            match_score: 0.9,
        },
        HotelCandidate {
            name: "grand hotel  tokyo".to_string(),
            address: "Chiyoda".to_string(),
            lat: 35.6801,
            lon: 139.7601,
            match_score: 0.9,
        },
        HotelCandidate {
            name: "Park Hyatt".to_string(),
            address: "Shinjuku".to_string(),
            lat: 35.69,
            lon: 139.70,
            match_score: 0.8,
        },
    ];

    let ranked = resolve_hotel_candidates(raw, 0.85, 0.01);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].candidate.name, "Grand Hotel Tokyo");
    assert_eq!(ranked[0].final_score, 0.9);
    assert_eq!(ranked[1].candidate.name, "Park Hyatt");
    assert!(ranked[1].distance_km > 5.0 && ranked[1].distance_km < 6.0);
    assert!(ranked[1].final_score < 0.8);
}

#[tokio::test]
async fn test_tool_call_drives_weather_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("\"tools\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "fetch_weather",
                        "arguments": "{\"place\":\"Tokyo\",\"start_date\":\"2025-10-01\",\"end_date\":\"2025-10-01\"}"
                    }
                }]
            }}]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "A light jacket is enough."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"name": "Tokyo", "latitude": 35.6895, "longitude": 139.6917, "country": "Japan"}]
        })))
        .mount(&server)
        .await;
    let one_day = json!({"daily": {
        "time": ["2025-10-01"],
        "temperature_2m_max": [22.0],
        "temperature_2m_min": [15.0],
        "precipitation_sum": [0.0],
        "weathercode": [1]
    }});
    for endpoint in ["/v1/jma", "/v1/forecast", "/v1/climate"] {
        mount_daily(&server, endpoint, one_day.clone()).await;
    }

    let model = llm_for(&server);
    let geocoder = OpenMeteoGeocoder::new(&WeatherConfig {
        geocoding_url: format!("{}/v1/search", server.uri()),
        ..WeatherConfig::default()
    })
    .unwrap();
    let aggregator = WeatherAggregator::new(client_for(&server));
    let advisor = OutfitAdvisor::new(model.clone(), "English");

    let run = run_weather_tools(
        &model,
        &geocoder,
        &aggregator,
        &advisor,
        "How is the weather in Tokyo on October 1st?",
        date("2025-09-28"),
    )
    .await
    .unwrap();

    let [ToolOutput::Weather(report)] = run.outputs.as_slice() else {
        panic!("expected one weather report, got {:?}", run.outputs);
    };
    assert!(report.outcome.is_success());
    assert_eq!(report.advice, vec![Some("A light jacket is enough.".to_string())]);
    let rendered = run.render();
    assert!(rendered.contains("Weather for Tokyo"));
    assert!(rendered.contains("mainly clear"));
}
