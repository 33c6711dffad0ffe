//! Quota gate — credential selection and its billing consequence.
//!
//! The gate answers one question per run: which API key executes it, and does
//! the run draw from organization quota? A model-bound credential (a
//! custom-provider key attached to the model itself) always wins and is never
//! chargeable; everything else is delegated to the billing collaborator,
//! which hands back either an organization-funded key (chargeable) or a
//! caller-supplied one (not).
//!
//! Charging is deliberately lock-free here: the orchestrator invokes
//! `charge` only on the success path, after cost computation, exactly once
//! per attempt. Storage-side idempotency is the billing collaborator's
//! concern.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use promptrun_core::{ResolvedCredential, Result};

/// A credential explicitly bound to a model (e.g. a custom-provider key).
#[derive(Clone, Debug)]
pub struct BoundCredential {
    pub api_key: String,
    pub base_url: Option<String>,
}

/// External billing collaborator.
///
/// `get_quota` fails with `ConfigNotFound` when the organization has no quota
/// row; `resolve_credential` fails with `CredentialNotFound` when no usable
/// key exists for the vendor.
#[async_trait]
pub trait BillingClient: Send + Sync {
    /// Current quota balance for an organization.
    async fn get_quota(&self, org_id: &str) -> Result<f64>;

    /// Deduct `amount` from the organization's quota.
    async fn charge_quota(&self, org_id: &str, amount: f64) -> Result<()>;

    /// Resolve the credential for a run: organization-funded
    /// (`chargeable = true`) or caller-supplied (`chargeable = false`).
    async fn resolve_credential(&self, org_id: &str, vendor: &str) -> Result<ResolvedCredential>;
}

/// Policy wrapper over the billing collaborator.
#[derive(Clone)]
pub struct QuotaGate {
    billing: Arc<dyn BillingClient>,
}

impl QuotaGate {
    pub fn new(billing: Arc<dyn BillingClient>) -> Self {
        QuotaGate { billing }
    }

    /// Quota balance; presence doubles as the "organization exists" check.
    pub async fn quota_balance(&self, org_id: &str) -> Result<f64> {
        self.billing.get_quota(org_id).await
    }

    /// Select the credential for a run.
    ///
    /// An explicit model binding short-circuits delegation and never draws
    /// from organization quota.
    pub async fn resolve_credential(
        &self,
        org_id: &str,
        vendor: &str,
        binding: Option<&BoundCredential>,
    ) -> Result<ResolvedCredential> {
        if let Some(bound) = binding {
            debug!(vendor, "using model-bound credential, quota not charged");
            return Ok(ResolvedCredential {
                api_key: bound.api_key.clone(),
                base_url: bound.base_url.clone(),
                chargeable: false,
            });
        }
        self.billing.resolve_credential(org_id, vendor).await
    }

    /// Deduct a successful run's cost from organization quota.
    ///
    /// Callers must only reach this on the success path of a chargeable run.
    pub async fn charge(&self, org_id: &str, amount: f64) -> Result<()> {
        debug!(org = org_id, amount, "charging quota");
        self.billing.charge_quota(org_id, amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptrun_core::RunError;
    use std::sync::Mutex;

    struct StubBilling {
        resolved: Mutex<u32>,
    }

    #[async_trait]
    impl BillingClient for StubBilling {
        async fn get_quota(&self, _org_id: &str) -> Result<f64> {
            Ok(10.0)
        }

        async fn charge_quota(&self, _org_id: &str, _amount: f64) -> Result<()> {
            Ok(())
        }

        async fn resolve_credential(
            &self,
            _org_id: &str,
            _vendor: &str,
        ) -> Result<ResolvedCredential> {
            *self.resolved.lock().unwrap() += 1;
            Ok(ResolvedCredential {
                api_key: "org-funded".into(),
                base_url: None,
                chargeable: true,
            })
        }
    }

    #[tokio::test]
    async fn test_bound_credential_wins_and_is_not_chargeable() {
        let billing = Arc::new(StubBilling {
            resolved: Mutex::new(0),
        });
        let gate = QuotaGate::new(billing.clone());

        let binding = BoundCredential {
            api_key: "custom-key".into(),
            base_url: Some("http://local:8080/v1".into()),
        };
        let cred = gate
            .resolve_credential("org-1", "custom", Some(&binding))
            .await
            .unwrap();

        assert_eq!(cred.api_key, "custom-key");
        assert!(!cred.chargeable);
        // Billing collaborator never consulted
        assert_eq!(*billing.resolved.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_binding_delegates_to_billing() {
        let billing = Arc::new(StubBilling {
            resolved: Mutex::new(0),
        });
        let gate = QuotaGate::new(billing.clone());

        let cred = gate.resolve_credential("org-1", "openai", None).await.unwrap();
        assert_eq!(cred.api_key, "org-funded");
        assert!(cred.chargeable);
        assert_eq!(*billing.resolved.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_error_shape() {
        struct NoKeys;

        #[async_trait]
        impl BillingClient for NoKeys {
            async fn get_quota(&self, _org_id: &str) -> Result<f64> {
                Ok(0.0)
            }
            async fn charge_quota(&self, _org_id: &str, _amount: f64) -> Result<()> {
                Ok(())
            }
            async fn resolve_credential(
                &self,
                org_id: &str,
                vendor: &str,
            ) -> Result<ResolvedCredential> {
                Err(RunError::CredentialNotFound(format!("{org_id}/{vendor}")))
            }
        }

        let gate = QuotaGate::new(Arc::new(NoKeys));
        let err = gate.resolve_credential("org-1", "openai", None).await.unwrap_err();
        assert!(matches!(err, RunError::CredentialNotFound(_)));
    }
}
