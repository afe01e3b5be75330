//! LLM Client: the single point of entry for all reasoning-service calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! All LLM interactions MUST go through `ReasoningTransport`.
//!
//! Structured output is obtained by forcing a single tool call whose `input_schema` is the
//! caller's schema. Each `send` is exactly one HTTP attempt; retry policy belongs to the
//! caller, which can tell transient failures apart via `LlmError::is_transient`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ReasoningConfig;

pub mod prompts;

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all reasoning calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM refused to answer (stop_reason: {0})")]
    Refused(String),
}

impl LlmError {
    /// Transport-level failures worth retrying: connection/timeout errors, 429 and 5xx.
    /// Malformed, empty or refused responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => !(e.is_decode() || e.is_builder() || e.is_redirect()),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Parse(_) | LlmError::EmptyContent | LlmError::Refused(_) => false,
        }
    }
}

/// A tool definition whose input schema constrains the model's output.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Everything needed for one schema-constrained call.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system: String,
    pub prompt: String,
    pub tool: ToolSpec,
}

/// One attempt against the reasoning service, returning the raw structured payload.
#[async_trait]
pub trait ReasoningTransport: Send + Sync {
    async fn send(&self, request: &StructuredRequest) -> Result<Value, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    tools: [&'a ToolSpec; 1],
    tool_choice: ToolChoice<'a>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    choice_type: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
    pub name: Option<String>,
    pub input: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    /// Input of the first `tool_use` block calling `tool_name`.
    pub fn tool_input(&self, tool_name: &str) -> Option<&Value> {
        self.content
            .iter()
            .find(|b| {
                b.block_type == "tool_use" && b.name.as_deref() == Some(tool_name)
            })
            .and_then(|b| b.input.as_ref())
    }

    /// The structured payload: the forced tool call's input, or a JSON text block if the
    /// model answered in text instead.
    pub fn structured_payload(&self, tool_name: &str) -> Result<Value, LlmError> {
        if let Some(reason) = self.stop_reason.as_deref().filter(|r| *r == "refusal") {
            return Err(LlmError::Refused(reason.to_string()));
        }
        if let Some(input) = self.tool_input(tool_name) {
            return Ok(input.clone());
        }
        let text = self
            .text()
            .map(strip_json_fences)
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyContent)?;
        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(config: &ReasoningConfig, api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(config.request_timeout).build()?,
            api_url: config.api_url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ReasoningTransport for LlmClient {
    async fn send(&self, request: &StructuredRequest) -> Result<Value, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: &request.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt,
            }],
            tools: [&request.tool],
            tool_choice: ToolChoice {
                choice_type: "tool",
                name: &request.tool.name,
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if status.as_u16() == 429 || status.is_server_error() {
                warn!("LLM API returned {}: {}", status, body);
            }
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        llm_response.structured_payload(&request.tool.name)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
