//! Canonical types for Promptrun — the one shape every vendor is mapped into.
//!
//! Vendors disagree about everything: parameter names, token accounting,
//! response envelopes. These types are the normalized contract; adapters
//! translate their wire format into them and nothing above an adapter ever
//! sees a vendor-specific shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sanitized parameter map, keyed exactly by the model schema's declared
/// parameters (plus `json_schema` when `response_format` is `"json_schema"`).
///
/// Insertion-ordered thanks to serde_json's `preserve_order` feature.
pub type SanitizedConfig = serde_json::Map<String, serde_json::Value>;

// ─────────────────────────────────────────────
// Provider request / response
// ─────────────────────────────────────────────

/// Everything an adapter needs to execute one call against its vendor.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
    /// API key for the vendor.
    pub api_key: String,
    /// Base URL override (custom/compatible endpoints); None = vendor default.
    pub base_url: Option<String>,
    /// Model identifier as the vendor knows it.
    pub model: String,
    /// System/instruction text (memory already appended by the orchestrator).
    pub instruction: String,
    /// The user's question.
    pub question: String,
    /// Sanitized, schema-complete parameters.
    pub parameters: SanitizedConfig,
    /// Price per million prompt tokens, in account currency.
    pub prompt_price: f64,
    /// Price per million completion tokens.
    pub completion_price: f64,
}

/// Token counts for one call, in the canonical shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: u64,
    pub completion: u64,
    pub total: u64,
}

impl TokenUsage {
    /// Build from prompt/completion counts; total is derived.
    pub fn new(prompt: u64, completion: u64) -> Self {
        TokenUsage {
            prompt,
            completion,
            total: prompt + completion,
        }
    }
}

/// Normalized result of one vendor call.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
    /// The first usable output item's text.
    pub answer: String,
    /// Token accounting (zeros when the vendor omits usage).
    pub tokens: TokenUsage,
    /// Wall-clock latency from just before the call to response receipt.
    pub response_time_ms: u64,
    /// Reasoning/thinking text, when the model exposes it.
    pub chain_of_thoughts: Option<String>,
    /// Vendor finish/stop reason, when reported.
    pub status: Option<String>,
}

// ─────────────────────────────────────────────
// Cost and credentials
// ─────────────────────────────────────────────

/// Cost of one call, split by token kind. All components are >= 0 and
/// `total == prompt + completion`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub prompt: f64,
    pub completion: f64,
    pub total: f64,
}

/// The credential selected for a run, with its billing consequence.
///
/// `chargeable` is the single bit the orchestrator consults before touching
/// quota: organization-funded keys charge, caller-supplied and model-bound
/// keys never do.
#[derive(Clone, Debug)]
pub struct ResolvedCredential {
    pub api_key: String,
    pub base_url: Option<String>,
    pub chargeable: bool,
}

// ─────────────────────────────────────────────
// Usage records
// ─────────────────────────────────────────────

/// One immutable, append-only record per run attempt — success or failure,
/// written exactly once and never updated afterward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Organization the run is attributed to.
    pub org_id: String,
    /// Project within the organization, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Calling user; omitted for system-level runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// The stored prompt that was executed, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    /// Model name as resolved from the registry.
    pub model: String,
    /// Vendor tag that served (or failed to serve) the request.
    pub vendor: String,
    /// Token accounting; all zeros for failed attempts.
    pub tokens: TokenUsage,
    /// Cost breakdown; all zeros for failed attempts.
    pub cost: CostBreakdown,
    /// Latency in milliseconds; zero for failed attempts.
    pub response_time_ms: u64,
    /// Whether the run produced an answer.
    pub success: bool,
    /// Error message for failed attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the attempt finished.
    pub created_at: DateTime<Utc>,
}
