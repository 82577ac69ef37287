//! OpenAI-compatible chat completions provider.
//!
//! Serves both OpenAI and DeepSeek, which exposes the same
//! `/chat/completions` API under its own base URL.

use crate::client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage,
};
use aipa_core::{AppError, AppResult};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// One server-sent event of a streamed completion.
#[derive(Debug, Deserialize)]
struct ChatStreamEvent {
    model: String,
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct OpenAiClient {
    /// Provider name reported to callers ("openai" or "deepseek")
    name: &'static str,

    /// Base URL, without the `/chat/completions` suffix
    base_url: String,

    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create an OpenAI client.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::with_base_url("openai", OPENAI_BASE_URL, api_key)
    }

    /// Create a DeepSeek client.
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self::with_base_url("deepseek", DEEPSEEK_BASE_URL, api_key)
    }

    /// Create a client against a custom OpenAI-compatible endpoint.
    pub fn with_base_url(
        name: &'static str,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn headers(&self) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| AppError::Llm(format!("Invalid API key header: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Convert LlmRequest to the wire format.
    ///
    /// OpenAI's current models take `max_completion_tokens`; DeepSeek still
    /// expects `max_tokens`.
    fn to_chat_request<'a>(&self, request: &'a LlmRequest, stream: bool) -> ChatRequest<'a> {
        let (max_tokens, max_completion_tokens) = if self.name == "openai" {
            (None, request.max_tokens)
        } else {
            (request.max_tokens, None)
        };

        ChatRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens,
            max_completion_tokens,
            stream,
        }
    }

    fn convert_response(response: ChatResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("Response contained no message content".to_string()))?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content: content.trim().to_string(),
            model: response.model,
            usage,
            done: true,
        })
    }

    async fn send(&self, request: &LlmRequest, stream: bool) -> AppResult<reqwest::Response> {
        let body = self.to_chat_request(request, stream);

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to {}: {}", self.name, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "{} API error ({}): {}",
                self.name, status, error_text
            )));
        }

        Ok(response)
    }
}

/// Parse one `data:` line of an SSE stream; `None` for keep-alives and `[DONE]`.
fn parse_sse_line(line: &str) -> Option<AppResult<LlmStreamChunk>> {
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    let event: ChatStreamEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => return Some(Err(AppError::Llm(format!("Failed to parse chunk: {}", e)))),
    };

    let choice = event.choices.into_iter().next();
    let done = choice
        .as_ref()
        .is_some_and(|c| c.finish_reason.is_some());
    let content = choice.and_then(|c| c.delta.content).unwrap_or_default();

    Some(Ok(LlmStreamChunk {
        content,
        model: event.model,
        done,
        usage: event
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens)),
    }))
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        self.name
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to {}", self.name);
        tracing::debug!("Request: {:?}", request);

        let response = self.send(request, false).await?;
        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse {} response: {}", self.name, e)))?;

        tracing::info!("Received completion from {}", self.name);
        tracing::debug!("Response: {:?}", chat_response);

        Self::convert_response(chat_response)
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!("Starting streaming request to {}", self.name);

        let response = self.send(request, true).await?;

        let stream = response.bytes_stream().map(|result| {
            let bytes = result.map_err(|e| AppError::Llm(format!("Stream error: {}", e)))?;
            let text = String::from_utf8_lossy(&bytes);
            let chunks: Vec<AppResult<LlmStreamChunk>> =
                text.lines().filter_map(parse_sse_line).collect();
            Ok(futures::stream::iter(chunks))
        });

        Ok(Box::pin(stream.flat_map(|result| match result {
            Ok(chunks) => chunks,
            Err(e) => futures::stream::iter(vec![Err(e)]),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepseek_client() {
        let client = OpenAiClient::deepseek("sk-test");
        assert_eq!(client.provider_name(), "deepseek");
        assert_eq!(client.endpoint(), "https://api.deepseek.com/chat/completions");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAiClient::with_base_url("openai", "http://localhost:8080/v1/", "k");
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_request_token_limit_field() {
        let request = LlmRequest::prompt(Some("sys"), "Hi", "gpt-5-mini").with_max_tokens(50);

        let openai = OpenAiClient::openai("k");
        let body = serde_json::to_value(openai.to_chat_request(&request, false)).unwrap();
        assert_eq!(body["max_completion_tokens"], 50);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hi");

        let deepseek = OpenAiClient::deepseek("k");
        let body = serde_json::to_value(deepseek.to_chat_request(&request, true)).unwrap();
        assert_eq!(body["max_tokens"], 50);
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_convert_response_trims() {
        let raw = r#"{
            "model": "gpt-5-mini",
            "choices": [{"message": {"role": "assistant", "content": "  Hello!\n"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let response = OpenAiClient::convert_response(parsed).unwrap();
        assert_eq!(response.content, "Hello!");
        assert_eq!(response.usage.total_tokens, 5);
    }

    #[test]
    fn test_convert_response_without_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        assert!(OpenAiClient::convert_response(parsed).is_err());
    }

    #[test]
    fn test_parse_sse_lines() {
        let chunk = parse_sse_line(
            r#"data: {"model":"deepseek-chat","choices":[{"delta":{"content":"Hi"},"finish_reason":null}]}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(chunk.content, "Hi");
        assert!(!chunk.done);

        assert!(parse_sse_line("data: [DONE]").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(matches!(parse_sse_line("data: {oops"), Some(Err(_))));
    }
}
