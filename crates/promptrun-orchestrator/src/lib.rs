//! Run orchestration for Promptrun.
//!
//! Composes the core registry/sanitizer/cost layers with the provider
//! dispatcher into one entry point, [`runner::Orchestrator::run`], and owns
//! the billing semantics around it: which credential a run uses, whether it
//! draws from organization quota, and the one usage record every attempt
//! leaves behind.
//!
//! # Architecture
//!
//! - [`quota::BillingClient`] — external billing collaborator contract
//! - [`quota::QuotaGate`] — credential selection + conditional charging
//! - [`usage::UsageRecorder`] — append-only outcome telemetry sink
//! - [`runner::Orchestrator`] — the per-run state machine

pub mod quota;
pub mod runner;
pub mod usage;

// Re-export main types for convenience
pub use quota::{BillingClient, BoundCredential, QuotaGate};
pub use runner::{ModelRef, Orchestrator, RunDescriptor, RunOutput, StoredPrompt};
pub use usage::UsageRecorder;
