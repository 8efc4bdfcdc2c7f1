//! Anthropic LLM provider with native API format.

use async_trait::async_trait;
use chatmeter_types::{ChatMessage, Role};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::error::LLMError;
use super::provider::LLMProvider;
use super::types::{Completion, CompletionRequest, TokenUsage};

/// Anthropic provider with native API format.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    api_version: String,
}

impl AnthropicProvider {
    pub const DEFAULT_API_VERSION: &'static str = "2023-06-01";

    #[must_use]
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "Anthropic"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LLMError> {
        let url = format!("{}/v1/messages", self.base_url);
        let anthropic_request = to_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&anthropic_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = response.text().await?;
        let anthropic_response: Value = serde_json::from_str(&body)?;
        Ok(from_response(&anthropic_response))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(serde::Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(serde::Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Error body: `{"type": "error", "error": {"type": "...", "message": "..."}}`.
#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn to_request(request: &CompletionRequest) -> Request<'_> {
    Request {
        model: &request.model,
        max_tokens: request.max_tokens,
        messages: request
            .messages
            .iter()
            .map(|msg: &ChatMessage| RequestMessage {
                role: role_label(msg.role),
                content: &msg.content,
            })
            .collect(),
    }
}

/// Read the success body leniently: any missing or mistyped field degrades
/// to empty text or a zero counter instead of failing the reply.
fn from_response(response: &Value) -> Completion {
    let text = response
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| {
            blocks.iter().find(|block| {
                block
                    .get("type")
                    .and_then(Value::as_str)
                    .is_none_or(|t| t == "text")
            })
        })
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let usage = response.get("usage");
    Completion {
        text,
        usage: TokenUsage {
            input_tokens: token_count(usage, "input_tokens"),
            output_tokens: token_count(usage, "output_tokens"),
        },
    }
}

/// Non-negative integer counter, clamped to `u32`. Anything else is 0.
fn token_count(usage: Option<&Value>, field: &str) -> u32 {
    usage
        .and_then(|u| u.get(field))
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Provider message if the body carries one, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|detail| detail.message)
        .filter(|message| !message.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.as_u16().to_string())
}
