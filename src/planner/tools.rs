//! Tool-calling weather assistant
//!
//! The model is offered `fetch_weather` and `recommend_outfit` and decides
//! from the user's message which of them to call; the calls are then run
//! here, in the order the model listed them.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::report::{WeatherReport, weather_report};
use super::request::{ExtractedQuery, WeatherQuery};
use crate::advice::{Conditions, OutfitAdvisor};
use crate::geocode::Geocoder;
use crate::llm::{ChatMessage, CompletionRequest, LanguageModel, ToolCall, ToolDefinition};
use crate::models::format_optional;
use crate::weather::{DailySource, WeatherAggregator};
use crate::{Result, TravelError};

pub const FETCH_WEATHER: &str = "fetch_weather";
pub const RECOMMEND_OUTFIT: &str = "recommend_outfit";

/// The tools offered to the model
#[must_use]
pub fn weather_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: FETCH_WEATHER.to_string(),
            description: "Fetch the daily weather for a place and an inclusive date range"
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "place": {"type": "string"},
                    "start_date": {"type": "string", "description": "YYYY-MM-DD"},
                    "end_date": {"type": "string", "description": "YYYY-MM-DD"}
                },
                "required": ["place", "start_date", "end_date"]
            }),
        },
        ToolDefinition {
            name: RECOMMEND_OUTFIT.to_string(),
            description: "Suggest clothing for the given temperatures and weather".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "temp_max": {"type": "number"},
                    "temp_min": {"type": "number"},
                    "precipitation": {"type": "number"},
                    "weather": {"type": "string"}
                },
                "required": ["temp_max", "temp_min", "precipitation", "weather"]
            }),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutfitArguments {
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precipitation: Option<f64>,
    #[serde(default)]
    pub weather: String,
}

/// A tool call with typed, validated arguments
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    FetchWeather(WeatherQuery),
    RecommendOutfit(OutfitArguments),
}

impl TryFrom<&ToolCall> for ToolInvocation {
    type Error = TravelError;

    fn try_from(call: &ToolCall) -> Result<Self> {
        match call.name.as_str() {
            FETCH_WEATHER => {
                let extracted: ExtractedQuery = call.parse_arguments()?;
                WeatherQuery::from_extracted(extracted).map(Self::FetchWeather)
            }
            RECOMMEND_OUTFIT => call.parse_arguments().map(Self::RecommendOutfit),
            other => Err(TravelError::validation(format!("Unknown tool '{other}'"))),
        }
    }
}

/// Result of running one tool call
#[derive(Debug, Clone)]
pub enum ToolOutput {
    Weather(WeatherReport),
    Outfit {
        arguments: OutfitArguments,
        advice: Option<String>,
    },
    Failed {
        tool: String,
        message: String,
    },
}

/// Everything the model asked for, in order
#[derive(Debug, Clone, Default)]
pub struct ToolRun {
    /// Text the model sent alongside (or instead of) tool calls
    pub content: Option<String>,
    pub outputs: Vec<ToolOutput>,
}

impl ToolRun {
    #[must_use]
    pub fn render(&self) -> String {
        if self.outputs.is_empty() {
            let mut out = String::from("The model did not call any tool.\n");
            if let Some(content) = &self.content {
                out.push_str(&format!("{content}\n"));
            }
            return out;
        }

        let mut out = String::new();
        for output in &self.outputs {
            match output {
                ToolOutput::Weather(report) => out.push_str(&report.render()),
                ToolOutput::Outfit { arguments, advice } => {
                    let weather = if arguments.weather.is_empty() {
                        "unknown weather"
                    } else {
                        arguments.weather.as_str()
                    };
                    out.push_str(&format!(
                        "Outfit for {weather} ({} / {}):\n  {}\n\n",
                        format_optional(arguments.temp_max, "°C"),
                        format_optional(arguments.temp_min, "°C"),
                        advice.as_deref().unwrap_or("no advice available"),
                    ));
                }
                ToolOutput::Failed { tool, message } => {
                    out.push_str(&format!("{tool} failed: {message}\n\n"));
                }
            }
        }
        out
    }
}

/// Let the model pick weather tools for `user_input` and run its calls.
///
/// A failing call is reported in the run and does not stop the others; only
/// a failed model request is an error.
#[instrument(skip(model, geocoder, aggregator, advisor))]
pub async fn run_weather_tools<M, G, S, A>(
    model: &M,
    geocoder: &G,
    aggregator: &WeatherAggregator<S>,
    advisor: &OutfitAdvisor<A>,
    user_input: &str,
    today: NaiveDate,
) -> Result<ToolRun>
where
    M: LanguageModel,
    G: Geocoder,
    S: DailySource,
    A: LanguageModel,
{
    let request = CompletionRequest::new(vec![
        ChatMessage::system(format!(
            "Today is {today}. Use the available tools to answer weather and clothing \
             questions. Dates are YYYY-MM-DD."
        )),
        ChatMessage::user(user_input),
    ])
    .with_tools(weather_tools());

    let reply = model.complete_with_tools(request).await?;
    info!("Model requested {} tool calls", reply.tool_calls.len());

    let mut outputs = Vec::with_capacity(reply.tool_calls.len());
    for call in &reply.tool_calls {
        debug!("Running tool '{}' with {}", call.name, call.arguments);
        let output = match ToolInvocation::try_from(call) {
            Ok(ToolInvocation::FetchWeather(query)) => {
                match weather_report(geocoder, aggregator, Some(advisor), query).await {
                    Ok(report) => ToolOutput::Weather(report),
                    Err(e) => failed(call, &e),
                }
            }
            Ok(ToolInvocation::RecommendOutfit(arguments)) => {
                let advice = advisor
                    .advise_conditions(&Conditions {
                        temp_max: arguments.temp_max,
                        temp_min: arguments.temp_min,
                        precipitation: arguments.precipitation,
                        condition: &arguments.weather,
                    })
                    .await;
                ToolOutput::Outfit { arguments, advice }
            }
            Err(e) => failed(call, &e),
        };
        outputs.push(output);
    }

    Ok(ToolRun {
        content: reply.content,
        outputs,
    })
}

fn failed(call: &ToolCall, error: &TravelError) -> ToolOutput {
    warn!("Tool '{}' failed: {}", call.name, error);
    ToolOutput::Failed {
        tool: call.name.clone(),
        message: error.user_message(),
    }
}
