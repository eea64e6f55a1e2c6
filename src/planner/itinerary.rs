//! Itinerary generation
//!
//! Gathers weather, tourist spots and the chosen hotel for a trip and asks the
//! language model for a day-by-day plan.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use super::request::TripRequest;
use super::spots::find_tourist_spots;
use crate::config::DefaultsConfig;
use crate::geocode::Geocoder;
use crate::llm::{ChatMessage, CompletionRequest, LanguageModel};
use crate::models::{FetchOutcome, Location, RankedHotel};
use crate::weather::{ClimateNormalsSource, DailySource, ExtendedDay, ExtendedForecast};
use crate::Result;

/// Everything looked up for one trip before writing the plan
#[derive(Debug, Clone, Serialize)]
pub struct TripContext {
    pub location: Location,
    pub weather: FetchOutcome<Vec<ExtendedDay>>,
    pub spots: Option<Value>,
}

/// A generated plan and the data it was built from
#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub context: TripContext,
    pub text: String,
}

/// Weather section of the itinerary prompt, one line per day
#[must_use]
pub fn weather_block(location: &str, days: &[ExtendedDay]) -> String {
    if days.is_empty() {
        return format!("Weather ({location}): unavailable\n");
    }
    let mut block = format!("Weekly weather ({location}):\n");
    for day in days {
        block.push_str(&day.summary_line());
        block.push('\n');
    }
    block
}

fn system_prompt(language: &str) -> String {
    format!(
        "You are a travel planner. Using the information below, write a Day 1 to Day N travel \
         plan in calendar form, in {language}. \
         Start every day with its weather and always give clothing advice based on that \
         temperature and weather. \
         Split each day into morning, afternoon and evening with sightseeing or activities. \
         For the evenings suggest nightlife or night views plus a representative local dish, \
         a different one each day. \
         On the first day plan nothing before the arrival time. \
         On the last day plan nothing after the departure time, keeping in mind that airport \
         check-in must happen one hour before boarding. \
         When hotel information is given, begin every day with 'Depart from hotel' and end \
         it with 'Return to hotel'. \
         Finish with a packing list for the whole trip."
    )
}

/// Messages for the final itinerary request
#[must_use]
pub fn itinerary_messages(
    user_input: &str,
    request: &TripRequest,
    context: &TripContext,
    hotel: Option<&RankedHotel>,
    language: &str,
) -> Vec<ChatMessage> {
    let days = context.weather.data().map_or(&[][..], Vec::as_slice);
    let mut user = format!(
        "Travel request: {user_input}\n\n{}\n",
        weather_block(&context.location.display_name(), days)
    );
    if let Some(hotel) = hotel {
        user.push_str(&format!(
            "Hotel: {} ({})\n",
            hotel.candidate.name, hotel.candidate.address
        ));
    }

    let travel_info = json!({
        "weather": days,
        "spots": context.spots,
        "arrival_time": request.arrival_time,
        "departure_time": request.departure_time,
        "hotel": hotel,
    });

    vec![
        ChatMessage::system(system_prompt(language)),
        ChatMessage::user(user),
        ChatMessage::user(format!("Travel info (JSON):\n{travel_info}")),
    ]
}

/// Sequential orchestration of the trip planning steps
pub struct TripPlanner<M, G, S, N> {
    model: M,
    geocoder: G,
    forecast: ExtendedForecast<S, N>,
    defaults: DefaultsConfig,
    language: String,
}

impl<M, G, S, N> TripPlanner<M, G, S, N>
where
    M: LanguageModel,
    G: Geocoder,
    S: DailySource,
    N: ClimateNormalsSource,
{
    pub fn new(
        model: M,
        geocoder: G,
        forecast: ExtendedForecast<S, N>,
        defaults: DefaultsConfig,
        language: impl Into<String>,
    ) -> Self {
        Self {
            model,
            geocoder,
            forecast,
            defaults,
            language: language.into(),
        }
    }

    /// Geocode the destination, then fetch weather and tourist spots.
    ///
    /// Only a failed geocoding aborts; weather and spot failures degrade.
    #[instrument(skip(self), fields(location = %request.location))]
    pub async fn gather(&self, request: &TripRequest) -> Result<TripContext> {
        let location = self.geocoder.geocode(&request.location).await?;

        let weather = self
            .forecast
            .build(location.coordinates(), request.start_date, request.days)
            .await;
        for issue in weather.issues() {
            warn!("Weather issue: {}", issue);
        }

        let spots = find_tourist_spots(&self.model, &request.location, self.defaults.spot_limit).await;

        Ok(TripContext {
            location,
            weather,
            spots,
        })
    }

    /// Run every step and return the generated plan
    #[instrument(skip(self, user_input, hotel), fields(location = %request.location))]
    pub async fn plan(
        &self,
        user_input: &str,
        request: &TripRequest,
        hotel: Option<&RankedHotel>,
    ) -> Result<Itinerary> {
        let context = self.gather(request).await?;
        let messages = itinerary_messages(user_input, request, &context, hotel, &self.language);

        let text = self.model.complete(CompletionRequest::new(messages)).await?;
        info!("Itinerary generated ({} characters)", text.len());

        Ok(Itinerary { context, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TravelError;
    use crate::llm::tests::ScriptedModel;
    use crate::models::HotelCandidate;
    use crate::weather::aggregator::tests::{FakeSource, rows_for};
    use crate::weather::{MonthlyNormal, Tier};
    use crate::models::Coordinates;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, place: &str) -> Result<Location> {
            if place == "Atlantis" {
                return Err(TravelError::not_found("no coordinates for 'Atlantis'"));
            }
            Ok(Location::new(35.0116, 135.7681, place.to_string()))
        }
    }

    struct NoNormals;

    #[async_trait]
    impl ClimateNormalsSource for NoNormals {
        async fn monthly_normals(&self, _: Coordinates, _: i32, _: i32) -> Result<Vec<MonthlyNormal>> {
            Err(TravelError::api("archive unavailable"))
        }
    }

    fn request(location: &str, days: u32) -> TripRequest {
        TripRequest {
            location: location.to_string(),
            days,
            start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            arrival_time: "day 1 14:00".to_string(),
            departure_time: "last day 12:00".to_string(),
        }
    }

    fn hotel() -> RankedHotel {
        RankedHotel {
            candidate: HotelCandidate {
                name: "Hotel Granvia Kyoto".to_string(),
                address: "Kyoto Station".to_string(),
                lat: 34.985,
                lon: 135.758,
                match_score: 0.95,
            },
            distance_km: 0.0,
            final_score: 0.95,
        }
    }

    fn planner(model: ScriptedModel) -> TripPlanner<ScriptedModel, FixedGeocoder, FakeSource, NoNormals> {
        let mut source = FakeSource::default();
        source
            .rows
            .insert(Tier::MediumRange, rows_for("2025-10-01", 3, 22.0, Some(0)));
        TripPlanner::new(
            model,
            FixedGeocoder,
            ExtendedForecast::new(source, NoNormals, 10),
            DefaultsConfig::default(),
            "English",
        )
    }

    #[test]
    fn test_weather_block_lines() {
        let days = vec![ExtendedDay {
            day: 1,
            date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            kind: crate::weather::DayKind::Forecast,
            temp_max: Some(22.0),
            temp_min: Some(15.0),
            precipitation: None,
            condition: "clear sky".to_string(),
        }];
        let block = weather_block("Kyoto", &days);
        assert!(block.starts_with("Weekly weather (Kyoto):\n"));
        assert!(block.contains("Day 1 (2025-10-01): max 22.0°C / min 15.0°C / condition: clear sky"));
        assert_eq!(weather_block("Kyoto", &[]), "Weather (Kyoto): unavailable\n");
    }

    #[tokio::test]
    async fn test_plan_runs_steps_in_order() {
        let model = ScriptedModel::replying(vec![
            Ok(r#"{"spots": [{"name": "Kiyomizu-dera", "description": "Temple"}]}"#.to_string()),
            Ok("Day 1: Depart from hotel ...".to_string()),
        ]);
        let planner = planner(model);
        let hotel = hotel();

        let itinerary = planner
            .plan("Kyoto for 3 days", &request("Kyoto", 3), Some(&hotel))
            .await
            .unwrap();

        assert_eq!(itinerary.text, "Day 1: Depart from hotel ...");
        assert!(itinerary.context.weather.is_success());
        assert!(itinerary.context.spots.is_some());

        let requests = planner.model.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let final_messages = &requests[1].messages;
        assert!(final_messages[0].content.contains("Depart from hotel"));
        assert!(final_messages[1].content.contains("Travel request: Kyoto for 3 days"));
        assert!(final_messages[1].content.contains("Day 3 (2025-10-03)"));
        assert!(final_messages[1].content.contains("Hotel: Hotel Granvia Kyoto (Kyoto Station)"));
        assert!(final_messages[2].content.contains("\"arrival_time\":\"day 1 14:00\""));
        assert!(final_messages[2].content.contains("Kiyomizu-dera"));
    }

    #[tokio::test]
    async fn test_weather_and_spot_failures_degrade() {
        let model = ScriptedModel::replying(vec![
            Err(TravelError::api("spots down")),
            Ok("plan".to_string()),
        ]);
        let planner = planner(model);

        // Day 6 and later need normals, which are unavailable
        let itinerary = planner.plan("Kyoto", &request("Kyoto", 7), None).await.unwrap();
        assert!(itinerary.context.spots.is_none());
        assert!(matches!(itinerary.context.weather, FetchOutcome::PartialFailure { .. }));
        assert_eq!(itinerary.context.weather.data().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn test_unknown_destination_aborts() {
        let planner = planner(ScriptedModel::default());
        let err = planner.plan("Atlantis", &request("Atlantis", 3), None).await.unwrap_err();
        assert!(matches!(err, TravelError::NotFound { .. }));
        assert!(planner.model.requests.lock().unwrap().is_empty());
    }
}
