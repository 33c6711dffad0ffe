//! Vendor adapter layer for Promptrun.
//!
//! Talks to each LLM backend over its own HTTP API and normalizes every
//! response into the canonical `ProviderResponse` shape.
//!
//! # Architecture
//!
//! - [`traits::ProviderAdapter`] — trait every vendor adapter implements
//! - [`dispatcher::ProviderDispatcher`] — vendor tag → adapter registry
//! - [`openai::OpenAiAdapter`] — OpenAI chat-completions API; also serves the
//!   `custom` tag for any OpenAI-compatible endpoint via a base-URL override
//! - [`anthropic::AnthropicAdapter`] — Anthropic messages API

pub mod anthropic;
pub mod dispatcher;
pub mod openai;
pub mod traits;

// Re-export main types for convenience
pub use anthropic::AnthropicAdapter;
pub use dispatcher::ProviderDispatcher;
pub use openai::OpenAiAdapter;
pub use traits::ProviderAdapter;
