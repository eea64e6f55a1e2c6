//! Language-model collaborator
//!
//! Every prompt-driven step (request extraction, hotel matching, tourist
//! spots, outfit advice, itinerary, tool selection) goes through
//! [`LanguageModel`] so it can be replaced by a fake in tests.

pub mod openai;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TravelError};

pub use openai::OpenAiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A function the model may ask the caller to run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object
    pub parameters: Value,
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments, as produced by the model
    pub arguments: String,
}

impl ToolCall {
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.arguments).map_err(|e| {
            TravelError::parse(format!("Invalid arguments for tool '{}': {e}", self.name))
        })
    }
}

/// Answer to a request that offered tools: text, tool calls, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// One chat completion call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Ask the model for a single JSON object
    pub json_mode: bool,
    pub max_tokens: Option<u32>,
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Single user message
    #[must_use]
    pub fn prompt<S: Into<String>>(prompt: S) -> Self {
        Self::new(vec![ChatMessage::user(prompt)])
    }

    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Return the text of the first choice
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Return the first choice, which may call one of `request.tools`.
    ///
    /// Models without tool support answer with plain text.
    async fn complete_with_tools(&self, request: CompletionRequest) -> Result<ToolReply> {
        let content = self.complete(request).await?;
        Ok(ToolReply {
            content: Some(content),
            tool_calls: Vec::new(),
        })
    }
}

/// Parse a model reply as JSON, tolerating Markdown fences and prose around
/// the outermost object.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let trimmed = reply.trim();
    let body = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(open), Some(close)) if open < close => &trimmed[open..=close],
        _ => trimmed,
    };
    serde_json::from_str(body)
        .map_err(|e| TravelError::parse(format!("Model reply is not valid JSON: {e}")))
}
