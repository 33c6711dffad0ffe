//! Anthropic adapter — the `/v1/messages` wire format.
//!
//! Differences from the OpenAI shape that matter here: auth is an `x-api-key`
//! header plus a pinned `anthropic-version`, the instruction rides in a
//! top-level `system` field, `max_tokens` is mandatory, and the answer is the
//! first `text` block of a typed content array (`thinking` blocks carry the
//! model's reasoning).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use promptrun_core::{ProviderRequest, ProviderResponse, Result, RunError, TokenUsage};

use crate::traits::ProviderAdapter;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// The messages API requires max_tokens; used when the schema declares none.
const FALLBACK_MAX_TOKENS: u64 = 1024;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "thinking")]
    Thinking { thinking: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

// ─────────────────────────────────────────────
// AnthropicAdapter
// ─────────────────────────────────────────────

/// Adapter for Anthropic's messages API.
pub struct AnthropicAdapter {
    client: reqwest::Client,
}

impl AnthropicAdapter {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        AnthropicAdapter { client }
    }

    fn messages_url(&self, request: &ProviderRequest) -> String {
        let base = request
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/v1/messages")
    }

    fn build_body(&self, request: &ProviderRequest) -> Value {
        let max_tokens = request
            .parameters
            .get("max_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(FALLBACK_MAX_TOKENS);

        let mut body = json!({
            "model": request.model,
            "max_tokens": max_tokens,
            "system": request.instruction,
            "messages": [{ "role": "user", "content": request.question }],
        });
        let map = body.as_object_mut().expect("body is an object");

        for (key, value) in &request.parameters {
            match key.as_str() {
                // Handled above or OpenAI-shaped; the messages API has no
                // counterpart for these.
                "max_tokens" | "response_format" | "json_schema" | "tools" => {}
                _ => {
                    if !value.is_null() {
                        map.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        body
    }
}

impl Default for AnthropicAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    async fn dispatch(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let url = self.messages_url(request);
        let body = self.build_body(request);

        debug!(model = %request.model, url = %url, "calling messages API");

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &request.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        let response_time_ms = started.elapsed().as_millis() as u64;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %error_text, "messages API error");
            return Err(RunError::Provider(format!(
                "Error calling LLM: {status} - {error_text}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| RunError::Provider(format!("Error parsing LLM response: {e}")))?;

        let tokens = parsed
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        let mut answer = None;
        let mut chain_of_thoughts = None;
        for block in parsed.content {
            match block {
                ContentBlock::Text { text } if answer.is_none() && !text.is_empty() => {
                    answer = Some(text);
                }
                ContentBlock::Thinking { thinking } if chain_of_thoughts.is_none() => {
                    chain_of_thoughts = Some(thinking);
                }
                _ => {}
            }
        }
        let answer = answer.ok_or(RunError::NoContent)?;

        debug!(
            tokens = tokens.total,
            response_time_ms,
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("?"),
            "messages API response received"
        );

        Ok(ProviderResponse {
            answer,
            tokens,
            response_time_ms,
            chain_of_thoughts,
            status: parsed.stop_reason,
        })
    }

    fn display_name(&self) -> &str {
        "Anthropic"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
