//! Error taxonomy for a prompt-execution run.
//!
//! Every layer (registry, dispatcher, quota gate, orchestrator) returns
//! `RunError` so a failure can cross crate boundaries unmodified. The
//! orchestrator never retries any of these; a transport beneath an adapter
//! may retry transparently before one ever surfaces.

use thiserror::Error;

/// Result type for run operations.
pub type Result<T> = std::result::Result<T, RunError>;

/// Errors that can occur while executing a prompt run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A required row is missing: model, prompt, organization, or quota.
    #[error("configuration not found: {0}")]
    ConfigNotFound(String),

    /// No usable API key could be resolved for this run.
    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    /// No adapter is registered for the vendor tag.
    #[error("unsupported vendor: {0}")]
    UnsupportedVendor(String),

    /// Opaque vendor-side failure, passed through unmodified.
    #[error("{0}")]
    Provider(String),

    /// The vendor responded without a usable output item.
    #[error("provider returned no content")]
    NoContent,
}

impl From<reqwest::Error> for RunError {
    fn from(err: reqwest::Error) -> Self {
        RunError::Provider(format!("Error calling LLM: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RunError::ConfigNotFound("model gpt-4o/openai".into());
        assert_eq!(err.to_string(), "configuration not found: model gpt-4o/openai");

        let err = RunError::UnsupportedVendor("FOO".into());
        assert_eq!(err.to_string(), "unsupported vendor: FOO");

        assert_eq!(RunError::NoContent.to_string(), "provider returned no content");
    }

    #[test]
    fn test_provider_error_is_verbatim() {
        // Provider errors carry the vendor's message with no prefix
        let err = RunError::Provider("429 - rate limit exceeded".into());
        assert_eq!(err.to_string(), "429 - rate limit exceeded");
    }
}
