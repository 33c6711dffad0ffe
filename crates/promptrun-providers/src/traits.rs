//! Provider adapter trait — the seam between dispatch and vendor wire formats.

use async_trait::async_trait;
use promptrun_core::{ProviderRequest, ProviderResponse, Result};

/// Trait that every vendor adapter implements.
///
/// An adapter owns exactly four jobs: build the vendor-specific call from the
/// canonical request, measure wall-clock latency from just before the call to
/// response receipt, extract the first usable output item (`NoContent` when
/// none exists), and map token counts into the canonical shape.
///
/// Adapters never retry and never cache; any retry policy belongs to the
/// transport beneath them.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Execute one call against the vendor.
    async fn dispatch(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
