//! Tourist spots, nightlife and local food suggestions

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::llm::{CompletionRequest, LanguageModel, parse_json_reply};

/// Up to `limit` sights with short descriptions as a JSON value,
/// or `None` when the model fails.
#[instrument(skip(model))]
pub async fn find_tourist_spots<M: LanguageModel>(
    model: &M,
    location: &str,
    limit: u32,
) -> Option<Value> {
    let prompt = format!(
        "List {limit} representative tourist spots in {location}, including nightlife and \
         local dishes to enjoy in the evening. Return a JSON object whose \"spots\" array \
         holds objects with \"name\" and a short \"description\"."
    );

    let reply = match model.complete(CompletionRequest::prompt(prompt).json()).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Tourist spot lookup failed: {}", e);
            return None;
        }
    };

    match parse_json_reply::<Value>(&reply) {
        Ok(spots) => {
            info!("Tourist spots for {} received", location);
            Some(spots)
        }
        Err(e) => {
            warn!("Discarding tourist spot reply: {}", e);
            None
        }
    }
}
