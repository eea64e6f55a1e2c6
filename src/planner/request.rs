//! Structured requests extracted from free text

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::DefaultsConfig;
use crate::llm::{ChatMessage, CompletionRequest, LanguageModel, parse_json_reply};
use crate::{Result, TravelError};

/// A trip as understood from the user's request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub location: String,
    pub days: u32,
    /// First day of the trip
    pub start_date: NaiveDate,
    pub arrival_time: String,
    pub departure_time: String,
}

/// A place and an inclusive date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub place: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractedTrip {
    location: Option<String>,
    days: Option<Value>,
    start_date: Option<String>,
    arrival_time: Option<String>,
    departure_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ExtractedQuery {
    place: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Days may come back as a number or as a numeric string
fn parse_days(value: Option<&Value>) -> Option<u32> {
    let days = match value? {
        Value::Number(n) => n.as_u64().and_then(|d| u32::try_from(d).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    days.filter(|d| *d > 0)
}

fn parse_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    non_empty(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| TravelError::validation(format!("Invalid {field} '{v}', expected YYYY-MM-DD")))
        })
        .transpose()
}

impl TripRequest {
    /// Apply trip defaults to whatever the model extracted
    fn from_extracted(extracted: ExtractedTrip, defaults: &DefaultsConfig, today: NaiveDate) -> Result<Self> {
        let location = non_empty(extracted.location)
            .ok_or_else(|| TravelError::validation("Could not tell where the trip goes"))?;

        Ok(Self {
            location,
            days: parse_days(extracted.days.as_ref()).unwrap_or(defaults.trip_days),
            start_date: parse_date(extracted.start_date, "start date")?.unwrap_or(today),
            arrival_time: non_empty(extracted.arrival_time)
                .unwrap_or_else(|| defaults.arrival_time.clone()),
            departure_time: non_empty(extracted.departure_time)
                .unwrap_or_else(|| defaults.departure_time.clone()),
        })
    }
}

/// Extract a [`TripRequest`] from free text, relative to `today`
#[instrument(skip(model, defaults))]
pub async fn extract_trip_request<M: LanguageModel>(
    model: &M,
    input: &str,
    defaults: &DefaultsConfig,
    today: NaiveDate,
) -> Result<TripRequest> {
    let system = format!(
        "Today is {today}. From the user's message extract the destination (location), \
         the number of days (days), the first day of the trip as YYYY-MM-DD (start_date), \
         the arrival date and time (arrival_time) and the departure date and time \
         (departure_time). Return them as a JSON object; use null for anything not mentioned."
    );
    let request = CompletionRequest::new(vec![ChatMessage::system(system), ChatMessage::user(input)]).json();

    let reply = model.complete(request).await?;
    let extracted: ExtractedTrip = parse_json_reply(&reply)?;
    debug!("Extracted trip: {:?}", extracted);

    TripRequest::from_extracted(extracted, defaults, today)
}

impl WeatherQuery {
    pub fn new(place: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        let place = place.into().trim().to_string();
        if place.is_empty() {
            return Err(TravelError::validation("Place name cannot be empty"));
        }
        Ok(Self {
            place,
            start_date,
            end_date,
        })
    }

    pub(super) fn from_extracted(extracted: ExtractedQuery) -> Result<Self> {
        let place = non_empty(extracted.place)
            .ok_or_else(|| TravelError::validation("Could not tell which place to look up"))?;
        let start_date = parse_date(extracted.start_date, "start date")?
            .ok_or_else(|| TravelError::validation("Could not tell the start date"))?;
        let end_date = parse_date(extracted.end_date, "end date")?.unwrap_or(start_date);
        Self::new(place, start_date, end_date)
    }
}

/// Extract a [`WeatherQuery`] from free text such as
/// "Tokyo from 2025-10-01 to 2025-10-20"
#[instrument(skip(model))]
pub async fn extract_weather_query<M: LanguageModel>(
    model: &M,
    input: &str,
    today: NaiveDate,
) -> Result<WeatherQuery> {
    let system = format!(
        "Today is {today}. From the user's message extract the place (place) and the \
         inclusive date range as YYYY-MM-DD (start_date, end_date). Return them as a JSON \
         object; use null for anything not mentioned."
    );
    let request = CompletionRequest::new(vec![ChatMessage::system(system), ChatMessage::user(input)]).json();

    let reply = model.complete(request).await?;
    let extracted: ExtractedQuery = parse_json_reply(&reply)?;
    debug!("Extracted weather query: {:?}", extracted);

    WeatherQuery::from_extracted(extracted)
}
