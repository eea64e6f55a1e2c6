//! OpenAI-compatible chat completions client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{ChatMessage, CompletionRequest, LanguageModel, ToolCall, ToolDefinition, ToolReply};
use crate::config::LlmConfig;
use crate::{Result, TravelError};

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSpec<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ToolSpec<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

impl From<WireToolCall> for ToolCall {
    fn from(call: WireToolCall) -> Self {
        Self {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiClient {
    /// Create a client; fails when no API key is configured
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TravelError::config("No LLM API key configured (set llm.api_key or OPENAI_API_KEY)")
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("TravelMate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
        })
    }

    /// POST one chat completion and return the first choice's message
    async fn send(&self, request: &CompletionRequest) -> Result<ChoiceMessage> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
            max_tokens: request.max_tokens,
            tools: request
                .tools
                .iter()
                .map(|function| ToolSpec {
                    kind: "function",
                    function,
                })
                .collect(),
        };

        debug!(
            "Chat completion request with {} messages and {} tools",
            request.messages.len(),
            request.tools.len()
        );
        let start_time = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(TravelError::api(format!(
                "Chat completion failed with status {status}: {reason}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TravelError::parse(format!("Failed to parse chat completion: {e}")))?;

        let duration = start_time.elapsed();
        if duration.as_secs() > 20 {
            warn!("Slow chat completion: {:.3}s", duration.as_secs_f64());
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| TravelError::parse("Chat completion contained no choices"))
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model, json = request.json_mode))]
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let content = self
            .send(&request)
            .await?
            .content
            .ok_or_else(|| TravelError::parse("Chat completion contained no message"))?;

        info!("Chat completion returned {} characters", content.len());
        Ok(content.trim().to_string())
    }

    #[instrument(skip_all, fields(model = %self.model, tools = request.tools.len()))]
    async fn complete_with_tools(&self, request: CompletionRequest) -> Result<ToolReply> {
        let message = self.send(&request).await?;
        let tool_calls: Vec<ToolCall> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(ToolCall::from)
            .collect();

        info!("Chat completion requested {} tool calls", tool_calls.len());
        Ok(ToolReply {
            content: message
                .content
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        let config = LlmConfig {
            base_url: format!("{}/v1/", server.uri()),
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        OpenAiClient::new(&config).unwrap()
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = OpenAiClient::new(&LlmConfig::default()).unwrap_err();
        assert!(matches!(err, TravelError::Config { .. }));
    }

    #[tokio::test]
    async fn test_json_mode_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "response_format": {"type": "json_object"},
                "max_tokens": 150,
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  {\"ok\": true}\n"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete(CompletionRequest::prompt("hello").json().max_tokens(150))
            .await
            .unwrap();
        assert_eq!(reply, "{\"ok\": true}");
    }

    #[tokio::test]
    async fn test_error_status_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(CompletionRequest::prompt("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, TravelError::Api { .. }));
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(CompletionRequest::prompt("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, TravelError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_tool_calls_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "tools": [{
                    "type": "function",
                    "function": {"name": "fetch_weather", "parameters": {"type": "object"}}
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "fetch_weather",
                            "arguments": "{\"place\": \"Tokyo\", \"start_date\": \"2025-10-01\", \"end_date\": \"2025-10-03\"}"
                        }
                    }]
                }}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = ToolDefinition {
            name: "fetch_weather".to_string(),
            description: "Weather for a place and date range".to_string(),
            parameters: json!({"type": "object"}),
        };
        let reply = client_for(&server)
            .complete_with_tools(CompletionRequest::prompt("Tokyo next week").with_tools(vec![tool]))
            .await
            .unwrap();

        assert_eq!(reply.content, None);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].id, "call_abc");
        assert_eq!(reply.tool_calls[0].name, "fetch_weather");
        let args: serde_json::Value = reply.tool_calls[0].parse_arguments().unwrap();
        assert_eq!(args["end_date"], "2025-10-03");
    }

    #[tokio::test]
    async fn test_plain_text_reply_to_tool_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Which city do you mean?"}}]
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete_with_tools(CompletionRequest::prompt("weather please"))
            .await
            .unwrap();
        assert_eq!(reply.content.as_deref(), Some("Which city do you mean?"));
        assert!(reply.tool_calls.is_empty());
    }
}
