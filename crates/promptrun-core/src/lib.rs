//! Core types and pure logic for Promptrun.
//!
//! This crate holds everything the provider and orchestrator layers share:
//!
//! - [`types`] — canonical request/response/cost/usage shapes
//! - [`error`] — the `RunError` taxonomy every layer speaks
//! - [`registry`] — per-vendor model definitions + default-model cache
//! - [`sanitize`] — the lenient parameter sanitizer
//! - [`cost`] — token-usage → cost breakdown math

pub mod cost;
pub mod error;
pub mod registry;
pub mod sanitize;
pub mod types;

// Re-export main types for convenience
pub use error::{Result, RunError};
pub use registry::{DefaultModelCache, ModelDefinition, ModelRegistry, ParameterSchema};
pub use sanitize::sanitize;
pub use types::{
    CostBreakdown, ProviderRequest, ProviderResponse, ResolvedCredential, SanitizedConfig,
    TokenUsage, UsageRecord,
};
