//! Per-day clothing advice

use tracing::{instrument, warn};

use crate::llm::{CompletionRequest, LanguageModel};
use crate::models::{DailyWeather, format_optional};

const ADVICE_MAX_TOKENS: u32 = 150;

/// The weather values advice is based on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions<'a> {
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precipitation: Option<f64>,
    pub condition: &'a str,
}

/// Asks the language model for one or two sentences of outfit advice
pub struct OutfitAdvisor<M> {
    model: M,
    language: String,
}

impl<M: LanguageModel> OutfitAdvisor<M> {
    pub fn new(model: M, language: impl Into<String>) -> Self {
        Self {
            model,
            language: language.into(),
        }
    }

    fn prompt(&self, conditions: &Conditions<'_>) -> String {
        format!(
            "Suggest what to wear to spend the day comfortably under these conditions.\n\n\
             - Maximum temperature: {}\n\
             - Minimum temperature: {}\n\
             - Weather: {}\n\
             - Precipitation: {}\n\n\
             Answer in {} with one or two sentences of concrete clothing and item \
             suggestions (umbrella, warm layers and so on).",
            format_optional(conditions.temp_max, "°C"),
            format_optional(conditions.temp_min, "°C"),
            conditions.condition,
            format_optional(conditions.precipitation, "mm"),
            self.language,
        )
    }

    /// Advice for one day, or `None` when the model is unavailable
    #[instrument(skip(self, day), fields(date = %day.date))]
    pub async fn advise(&self, day: &DailyWeather) -> Option<String> {
        self.advise_conditions(&Conditions {
            temp_max: day.temp_max,
            temp_min: day.temp_min,
            precipitation: day.precipitation,
            condition: &day.condition,
        })
        .await
    }

    /// Advice for conditions that do not belong to a dated record
    pub async fn advise_conditions(&self, conditions: &Conditions<'_>) -> Option<String> {
        let request = CompletionRequest::prompt(self.prompt(conditions)).max_tokens(ADVICE_MAX_TOKENS);
        match self.model.complete(request).await {
            Ok(advice) if !advice.trim().is_empty() => Some(advice.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("Outfit advice unavailable: {}", e);
                None
            }
        }
    }
}
