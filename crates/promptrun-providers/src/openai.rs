//! OpenAI-compatible adapter — the `/chat/completions` wire format.
//!
//! Serves two vendor tags: `openai` against the hosted default endpoint, and
//! `custom` for any OpenAI-compatible endpoint the caller brings, selected
//! purely by the request's base-URL override. One adapter, zero duplicated
//! logic.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use promptrun_core::{ProviderRequest, ProviderResponse, Result, RunError, TokenUsage};

use crate::traits::ProviderAdapter;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ─────────────────────────────────────────────
// OpenAiAdapter
// ─────────────────────────────────────────────

/// Adapter for OpenAI and OpenAI-compatible chat-completions endpoints.
pub struct OpenAiAdapter {
    /// HTTP client (shared, connection-pooled). The fixed timeout and any
    /// transport-level retries live here, invisible to the dispatcher.
    client: reqwest::Client,
}

impl OpenAiAdapter {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        OpenAiAdapter { client }
    }

    /// Build the full chat completions URL from the request's base override
    /// or the hosted default.
    fn completions_url(&self, request: &ProviderRequest) -> String {
        let base = request
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Merge the sanitized parameters into the request body.
    ///
    /// Most parameters pass through verbatim. `response_format` is mapped to
    /// the OpenAI object shape, with the stored `json_schema` string parsed
    /// back into JSON; empty tool lists are omitted entirely.
    fn build_body(&self, request: &ProviderRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": [
                ChatMessage { role: "system", content: &request.instruction },
                ChatMessage { role: "user", content: &request.question },
            ],
        });
        let map = body.as_object_mut().expect("body is an object");

        for (key, value) in &request.parameters {
            match key.as_str() {
                "response_format" => match value.as_str() {
                    Some("json_object") => {
                        map.insert(key.clone(), json!({ "type": "json_object" }));
                    }
                    Some("json_schema") => {
                        let schema = request
                            .parameters
                            .get("json_schema")
                            .and_then(Value::as_str)
                            .and_then(|s| serde_json::from_str::<Value>(s).ok())
                            .unwrap_or_else(|| json!({}));
                        map.insert(
                            key.clone(),
                            json!({ "type": "json_schema", "json_schema": schema }),
                        );
                    }
                    // "text" is the API default; sending nothing is equivalent.
                    _ => {}
                },
                // Folded into response_format above.
                "json_schema" => {}
                "tools" => {
                    if value.as_array().is_some_and(|t| !t.is_empty()) {
                        map.insert(key.clone(), value.clone());
                    }
                }
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

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    async fn dispatch(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let url = self.completions_url(request);
        let body = self.build_body(request);

        debug!(model = %request.model, url = %url, "calling chat completions");

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&request.api_key)
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
            error!(status = %status, body = %error_text, "chat completions API error");
            return Err(RunError::Provider(format!(
                "Error calling LLM: {status} - {error_text}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| RunError::Provider(format!("Error parsing LLM response: {e}")))?;

        let tokens = parsed
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let choice = parsed.choices.into_iter().next().ok_or(RunError::NoContent)?;
        let answer = choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or(RunError::NoContent)?;

        debug!(
            tokens = tokens.total,
            response_time_ms,
            finish_reason = choice.finish_reason.as_deref().unwrap_or("?"),
            "chat completions response received"
        );

        Ok(ProviderResponse {
            answer,
            tokens,
            response_time_ms,
            chain_of_thoughts: choice.message.reasoning_content,
            status: choice.finish_reason,
        })
    }

    fn display_name(&self) -> &str {
        "OpenAI"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
