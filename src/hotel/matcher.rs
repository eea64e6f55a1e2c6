//! Hotel name lookup through the language model
//!
//! The model is asked for up to `limit` hotels resembling the given name in
//! the given region, each with coordinates and a self-assessed match score.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::llm::{CompletionRequest, LanguageModel, parse_json_reply};
use crate::models::HotelCandidate;
use crate::models::hotel::null_as_default;

#[async_trait]
pub trait HotelMatcher: Send + Sync {
    /// Candidates for `name` in `region`. Failures yield an empty list.
    async fn find_candidates(&self, name: &str, region: &str) -> Vec<HotelCandidate>;
}

#[derive(Debug, Deserialize)]
struct CandidateList {
    /// Kept untyped so one malformed entry does not discard the rest
    #[serde(default, deserialize_with = "null_as_default")]
    candidates: Vec<Value>,
}

pub struct LlmHotelMatcher<M> {
    model: M,
    limit: u32,
    match_threshold: f64,
}

impl<M: LanguageModel> LlmHotelMatcher<M> {
    pub fn new(model: M, limit: u32, match_threshold: f64) -> Self {
        Self {
            model,
            limit,
            match_threshold,
        }
    }

    fn prompt(&self, name: &str, region: &str) -> String {
        format!(
            "Return up to {limit} hotel candidates matching the following hotel name.\n\
             Hotel name: {name}, region: {region}\n\
             Every candidate must include a similarity score (match_score: 0.0 to 1.0). \
             Use 1.0 for a near exact match, about 0.7 for a partial match and 0.5 or less \
             for unrelated hotels.\n\
             Respond with JSON only, in exactly this shape:\n\
             {{\n  \"candidates\": [\n    {{\"name\": string, \"address\": string, \"lat\": float, \"lon\": float, \"match_score\": float}}\n  ]\n}}",
            limit = self.limit,
        )
    }
}

#[async_trait]
impl<M: LanguageModel> HotelMatcher for LlmHotelMatcher<M> {
    #[instrument(skip(self))]
    async fn find_candidates(&self, name: &str, region: &str) -> Vec<HotelCandidate> {
        let request = CompletionRequest::prompt(self.prompt(name, region)).json();
        let reply = match self.model.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Hotel lookup failed: {}", e);
                return Vec::new();
            }
        };

        let list: CandidateList = match parse_json_reply(&reply) {
            Ok(list) => list,
            Err(e) => {
                warn!("Discarding hotel lookup reply: {}", e);
                return Vec::new();
            }
        };

        let candidates: Vec<HotelCandidate> = list
            .candidates
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<HotelCandidate>(entry) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    warn!("Skipping malformed hotel candidate: {}", e);
                    None
                }
            })
            .filter(|c| c.match_score >= self.match_threshold)
            .collect();
        info!("Hotel lookup returned {} candidates above threshold", candidates.len());
        candidates
    }
}
