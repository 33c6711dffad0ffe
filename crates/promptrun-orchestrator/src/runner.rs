//! Request orchestrator — one prompt execution, end to end.
//!
//! Per run, in order: resolve model and organization context, resolve the
//! credential, apply memory/override to the instruction, dispatch to the
//! vendor adapter, compute cost, charge quota (chargeable credentials on
//! success only), record the outcome, return or re-raise.
//!
//! Single attempt, no retries. Failure handling is positional: anything that
//! breaks before credential resolution raises directly; anything at or after
//! it leaves exactly one zero-metric failure record behind and then re-raises
//! the original error unmodified.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use promptrun_core::{
    cost, CostBreakdown, DefaultModelCache, ModelDefinition, ModelRegistry, ProviderRequest,
    ProviderResponse, Result, RunError, SanitizedConfig, TokenUsage, UsageRecord,
};
use promptrun_providers::ProviderDispatcher;

use crate::quota::{BoundCredential, QuotaGate};
use crate::usage::{UsageRecorder, SYSTEM_ORG_ID, SYSTEM_PROJECT_ID};

// ─────────────────────────────────────────────
// Run descriptors
// ─────────────────────────────────────────────

/// Reference to a registry model by `(name, vendor)`.
#[derive(Clone, Debug)]
pub struct ModelRef {
    pub name: String,
    pub vendor: String,
}

/// The stored prompt a run executes. Its `config` was sanitized at
/// settings-update time and is consumed as-is here — never re-sanitized.
#[derive(Clone, Debug)]
pub struct StoredPrompt {
    pub id: String,
    pub instruction: String,
    /// Pinned model; `None` falls back to the cached default model.
    pub model: Option<ModelRef>,
    pub config: SanitizedConfig,
    /// Credential bound to the model itself (custom providers).
    pub bound_credential: Option<BoundCredential>,
}

/// Everything a caller supplies for one run.
#[derive(Clone, Debug)]
pub struct RunDescriptor {
    pub org_id: String,
    pub project_id: Option<String>,
    pub user_id: Option<String>,
    pub prompt: StoredPrompt,
    pub question: String,
    /// Memory text appended verbatim after the instruction.
    pub memory: Option<String>,
    /// Replaces the stored instruction when supplied.
    pub instruction_override: Option<String>,
    /// System-level runs get an enveloped instruction and system attribution.
    pub system_run: bool,
}

/// Successful run result.
#[derive(Clone, Debug)]
pub struct RunOutput {
    pub answer: String,
    pub tokens: TokenUsage,
    pub cost: CostBreakdown,
    pub response_time_ms: u64,
    pub chain_of_thoughts: Option<String>,
    pub status: Option<String>,
}

// ─────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────

/// Composes registry, quota gate, dispatcher, cost math, and usage recording
/// into the single `run` entry point.
pub struct Orchestrator {
    registry: Arc<ModelRegistry>,
    default_model: Arc<DefaultModelCache>,
    dispatcher: Arc<ProviderDispatcher>,
    quota: QuotaGate,
    usage: Arc<dyn UsageRecorder>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ModelRegistry>,
        default_model: Arc<DefaultModelCache>,
        dispatcher: Arc<ProviderDispatcher>,
        quota: QuotaGate,
        usage: Arc<dyn UsageRecorder>,
    ) -> Self {
        Orchestrator {
            registry,
            default_model,
            dispatcher,
            quota,
            usage,
        }
    }

    /// Clear the default-model cache; the next unpinned run re-resolves it.
    pub fn invalidate_default_model(&self) {
        self.default_model.invalidate();
    }

    /// Execute one prompt run.
    pub async fn run(&self, descriptor: RunDescriptor) -> Result<RunOutput> {
        // Context resolution: failures here raise with no usage record.
        let model = self.resolve_model(&descriptor)?;
        self.quota.quota_balance(&descriptor.org_id).await?;

        debug!(
            model = %model.name,
            vendor = %model.vendor,
            prompt = %descriptor.prompt.id,
            system_run = descriptor.system_run,
            "run context resolved"
        );

        // From credential resolution on, every outcome leaves one record.
        match self.execute(&descriptor, &model).await {
            Ok((response, run_cost)) => {
                info!(
                    model = %model.name,
                    tokens = response.tokens.total,
                    cost = run_cost.total,
                    response_time_ms = response.response_time_ms,
                    "run succeeded"
                );
                self.record(
                    &descriptor,
                    &model,
                    response.tokens,
                    run_cost,
                    response.response_time_ms,
                    None,
                )
                .await;
                Ok(RunOutput {
                    answer: response.answer,
                    tokens: response.tokens,
                    cost: run_cost,
                    response_time_ms: response.response_time_ms,
                    chain_of_thoughts: response.chain_of_thoughts,
                    status: response.status,
                })
            }
            Err(err) => {
                error!(model = %model.name, error = %err, "run failed");
                self.record(
                    &descriptor,
                    &model,
                    TokenUsage::default(),
                    CostBreakdown::default(),
                    0,
                    Some(err.to_string()),
                )
                .await;
                Err(err)
            }
        }
    }

    fn resolve_model(&self, descriptor: &RunDescriptor) -> Result<Arc<ModelDefinition>> {
        match &descriptor.prompt.model {
            Some(pinned) => self
                .registry
                .find(&pinned.name, &pinned.vendor)
                .cloned()
                .map(Arc::new)
                .ok_or_else(|| {
                    RunError::ConfigNotFound(format!("model {}/{}", pinned.name, pinned.vendor))
                }),
            None => self
                .default_model
                .get_or_resolve(|| self.registry.models().first().cloned())
                .ok_or_else(|| RunError::ConfigNotFound("default model".to_string())),
        }
    }

    /// Credential → dispatch → cost → conditional charge.
    async fn execute(
        &self,
        descriptor: &RunDescriptor,
        model: &ModelDefinition,
    ) -> Result<(ProviderResponse, CostBreakdown)> {
        let credential = self
            .quota
            .resolve_credential(
                &descriptor.org_id,
                &model.vendor,
                descriptor.prompt.bound_credential.as_ref(),
            )
            .await?;

        let request = ProviderRequest {
            api_key: credential.api_key,
            base_url: credential.base_url,
            model: model.name.clone(),
            instruction: effective_instruction(descriptor),
            question: descriptor.question.clone(),
            parameters: descriptor.prompt.config.clone(),
            prompt_price: model.pricing.prompt_per_million,
            completion_price: model.pricing.completion_per_million,
        };

        let response = self.dispatcher.dispatch(&model.vendor, &request).await?;
        let run_cost = cost::compute(response.tokens, model.pricing);

        // Quota is touched on the success path only, after cost is known.
        if credential.chargeable {
            self.quota.charge(&descriptor.org_id, run_cost.total).await?;
        }

        Ok((response, run_cost))
    }

    /// Write the attempt's single usage record.
    async fn record(
        &self,
        descriptor: &RunDescriptor,
        model: &ModelDefinition,
        tokens: TokenUsage,
        run_cost: CostBreakdown,
        response_time_ms: u64,
        description: Option<String>,
    ) {
        let (org_id, project_id, user_id) = if descriptor.system_run {
            // System runs are attributed to the process-wide system context;
            // the caller's identity stays out of the record.
            (
                SYSTEM_ORG_ID.to_string(),
                Some(SYSTEM_PROJECT_ID.to_string()),
                None,
            )
        } else {
            (
                descriptor.org_id.clone(),
                descriptor.project_id.clone(),
                descriptor.user_id.clone(),
            )
        };

        let success = description.is_none();
        self.usage
            .append(UsageRecord {
                org_id,
                project_id,
                user_id,
                prompt_id: Some(descriptor.prompt.id.clone()),
                model: model.name.clone(),
                vendor: model.vendor.clone(),
                tokens,
                cost: run_cost,
                response_time_ms,
                success,
                description,
                created_at: Utc::now(),
            })
            .await;
    }
}

/// Override-else-stored instruction, with memory concatenated verbatim and
/// the system envelope applied last.
fn effective_instruction(descriptor: &RunDescriptor) -> String {
    let mut instruction = descriptor
        .instruction_override
        .clone()
        .unwrap_or_else(|| descriptor.prompt.instruction.clone());

    if let Some(memory) = &descriptor.memory {
        instruction.push_str(memory);
    }

    if descriptor.system_run {
        instruction = format!("[system]\n{instruction}\n[/system]");
    }

    instruction
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
