//! Usage recording — the append-only outcome telemetry sink.
//!
//! The orchestrator writes exactly one record per attempt that reaches
//! credential resolution, success or failure, and never updates a record
//! afterward. Recorder failures are the sink's own problem: implementations
//! log and swallow, so telemetry can never change a run's outcome.

use async_trait::async_trait;

use promptrun_core::UsageRecord;

/// Organization a system-level run is attributed to.
pub const SYSTEM_ORG_ID: &str = "system";
/// Project a system-level run is attributed to.
pub const SYSTEM_PROJECT_ID: &str = "system";

/// Append-only sink for run outcome records.
#[async_trait]
pub trait UsageRecorder: Send + Sync {
    /// Append one record. Fire-and-forget: implementations must not fail the
    /// caller.
    async fn append(&self, record: UsageRecord);
}
