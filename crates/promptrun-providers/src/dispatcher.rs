//! Provider dispatcher — maps a vendor tag to its registered adapter.
//!
//! Adding a vendor means registering an adapter under a tag; there is no
//! central conditional to edit. Two tags may share one adapter instance:
//! `custom` (any OpenAI-compatible endpoint) reuses the OpenAI adapter and is
//! differentiated only by the request's base-URL override.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use promptrun_core::{ProviderRequest, ProviderResponse, Result, RunError};

use crate::anthropic::AnthropicAdapter;
use crate::openai::OpenAiAdapter;
use crate::traits::ProviderAdapter;

/// Vendor tag for the primary OpenAI-hosted backend.
pub const VENDOR_OPENAI: &str = "openai";
/// Vendor tag for Anthropic.
pub const VENDOR_ANTHROPIC: &str = "anthropic";
/// Vendor tag for bring-your-own OpenAI-compatible endpoints.
pub const VENDOR_CUSTOM: &str = "custom";

/// Registry of vendor tag → adapter.
#[derive(Default)]
pub struct ProviderDispatcher {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl ProviderDispatcher {
    /// Empty dispatcher with no adapters registered.
    pub fn new() -> Self {
        ProviderDispatcher {
            adapters: HashMap::new(),
        }
    }

    /// Dispatcher with the built-in adapters registered: `openai` and
    /// `custom` share one OpenAI-compatible adapter; `anthropic` gets its own.
    pub fn with_default_adapters() -> Self {
        let mut dispatcher = ProviderDispatcher::new();
        let openai = Arc::new(OpenAiAdapter::new());
        dispatcher.register(VENDOR_OPENAI, openai.clone());
        dispatcher.register(VENDOR_CUSTOM, openai);
        dispatcher.register(VENDOR_ANTHROPIC, Arc::new(AnthropicAdapter::new()));
        dispatcher
    }

    /// Register an adapter under a vendor tag. Re-registering a tag replaces
    /// the previous adapter.
    pub fn register(&mut self, tag: impl Into<String>, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(tag.into(), adapter);
    }

    /// Registered vendor tags.
    pub fn vendors(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    /// Dispatch a request to the adapter registered for `tag`.
    pub async fn dispatch(&self, tag: &str, request: &ProviderRequest) -> Result<ProviderResponse> {
        let adapter = self
            .adapters
            .get(tag)
            .ok_or_else(|| RunError::UnsupportedVendor(tag.to_string()))?;

        debug!(
            vendor = tag,
            adapter = adapter.display_name(),
            model = %request.model,
            "dispatching provider request"
        );
        adapter.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use promptrun_core::TokenUsage;

    struct EchoAdapter;

    #[async_trait]
    impl ProviderAdapter for EchoAdapter {
        async fn dispatch(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
            Ok(ProviderResponse {
                answer: format!("echo: {}", request.question),
                tokens: TokenUsage::new(1, 1),
                response_time_ms: 0,
                chain_of_thoughts: None,
                status: Some("stop".into()),
            })
        }

        fn display_name(&self) -> &str {
            "Echo"
        }
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            api_key: "key".into(),
            base_url: None,
            model: "m".into(),
            instruction: "be brief".into(),
            question: "hi".into(),
            parameters: Default::default(),
            prompt_price: 0.0,
            completion_price: 0.0,
        }
    }

    #[tokio::test]
    async fn test_unknown_vendor_fails_with_unsupported_vendor() {
        let dispatcher = ProviderDispatcher::with_default_adapters();
        let err = dispatcher.dispatch("FOO", &request()).await.unwrap_err();
        assert!(matches!(err, RunError::UnsupportedVendor(tag) if tag == "FOO"));
    }

    #[tokio::test]
    async fn test_registered_adapter_is_dispatched() {
        let mut dispatcher = ProviderDispatcher::new();
        dispatcher.register("echo", Arc::new(EchoAdapter));

        let resp = dispatcher.dispatch("echo", &request()).await.unwrap();
        assert_eq!(resp.answer, "echo: hi");
    }

    #[test]
    fn test_default_adapters_cover_builtin_vendors() {
        let dispatcher = ProviderDispatcher::with_default_adapters();
        let mut vendors: Vec<&str> = dispatcher.vendors().collect();
        vendors.sort_unstable();
        assert_eq!(vendors, vec!["anthropic", "custom", "openai"]);
    }

    #[test]
    fn test_reregistering_replaces_adapter() {
        let mut dispatcher = ProviderDispatcher::new();
        dispatcher.register("echo", Arc::new(EchoAdapter));
        dispatcher.register("echo", Arc::new(EchoAdapter));
        assert_eq!(dispatcher.vendors().count(), 1);
    }
}
