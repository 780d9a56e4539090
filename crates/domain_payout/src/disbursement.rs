//! Disbursement provider contract
//!
//! The provider is the external money-movement API that actually pushes
//! funds to the partner's bank. The contract is small on purpose:
//!
//! - Every request carries an `external_id`, the idempotency key. The
//!   provider deduplicates on it, so a request whose outcome is unknown is
//!   reconciled by querying that same key, never by retrying with a fresh
//!   one.
//! - `Transport` errors mean exactly that unknown outcome. They are kept
//!   apart from `Rejected` (the provider said no) and `Configuration`
//!   (our credentials or channel setup are wrong).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{DisbursementId, DomainPort, Money, PortError};
use domain_banking::BankChannel;

/// Request to push funds to a bank account
#[derive(Debug, Clone, Serialize)]
pub struct DisbursementRequest {
    /// Idempotency key; the provider deduplicates on this
    pub external_id: DisbursementId,
    pub amount: Money,
    pub channel: BankChannel,
    pub account_number: String,
    pub holder_name: String,
    /// Optional receipt email for the beneficiary
    pub email: Option<String>,
    pub description: Option<String>,
}

/// Provider-side status of a disbursement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisbursementStatus {
    /// Accepted by the provider, transfer not yet confirmed
    Issued,
    /// Funds confirmed at the destination bank
    Disbursed,
    /// The transfer failed after acceptance
    Failed,
}

/// A disbursement as the provider reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disbursement {
    pub external_id: DisbursementId,
    /// The provider's own reference for support lookups
    pub provider_reference: Option<String>,
    pub status: DisbursementStatus,
    pub failure_reason: Option<String>,
}

/// Errors from the disbursement provider
#[derive(Debug, Error)]
pub enum DisbursementError {
    /// Our credentials or channel configuration are wrong; retrying the
    /// same request cannot help
    #[error("Disbursement configuration error: {0}")]
    Configuration(String),

    /// The provider refused the request (bad account, limits, balance)
    #[error("Disbursement rejected: {0}")]
    Rejected(String),

    /// The call failed in transit; the disbursement may exist. Reconcile
    /// via the same external_id, never reissue under a new key.
    #[error("Disbursement transport failure: {0}")]
    Transport(#[from] PortError),
}

impl DisbursementError {
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, DisbursementError::Transport(e) if e.is_outcome_unknown())
    }
}

/// Port to the external disbursement provider
#[async_trait]
pub trait DisbursementProvider: DomainPort {
    /// Issues a disbursement; idempotent on `request.external_id`
    async fn create_disbursement(
        &self,
        request: DisbursementRequest,
    ) -> Result<Disbursement, DisbursementError>;

    /// Looks up a disbursement by its idempotency key (reconciliation)
    async fn get_disbursement(
        &self,
        external_id: DisbursementId,
    ) -> Result<Disbursement, DisbursementError>;
}

/// In-memory mock provider
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock provider that accepts everything and remembers it by key
    #[derive(Debug, Default)]
    pub struct MockDisbursementProvider {
        disbursements: Arc<RwLock<HashMap<DisbursementId, Disbursement>>>,
        reject_with: Arc<RwLock<Option<String>>>,
    }

    impl MockDisbursementProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent create call fail with this rejection
        pub async fn reject_all(&self, reason: &str) {
            *self.reject_with.write().await = Some(reason.to_string());
        }

        /// Marks a stored disbursement as confirmed
        pub async fn confirm(&self, external_id: DisbursementId) {
            if let Some(d) = self.disbursements.write().await.get_mut(&external_id) {
                d.status = DisbursementStatus::Disbursed;
            }
        }
    }

    impl DomainPort for MockDisbursementProvider {}

    #[async_trait]
    impl DisbursementProvider for MockDisbursementProvider {
        async fn create_disbursement(
            &self,
            request: DisbursementRequest,
        ) -> Result<Disbursement, DisbursementError> {
            if let Some(reason) = self.reject_with.read().await.clone() {
                return Err(DisbursementError::Rejected(reason));
            }

            let mut disbursements = self.disbursements.write().await;
            // Idempotent on the external id
            if let Some(existing) = disbursements.get(&request.external_id) {
                return Ok(existing.clone());
            }

            let disbursement = Disbursement {
                external_id: request.external_id,
                provider_reference: Some(format!("mock-{}", request.external_id.as_uuid())),
                status: DisbursementStatus::Issued,
                failure_reason: None,
            };
            disbursements.insert(request.external_id, disbursement.clone());
            Ok(disbursement)
        }

        async fn get_disbursement(
            &self,
            external_id: DisbursementId,
        ) -> Result<Disbursement, DisbursementError> {
            self.disbursements
                .read()
                .await
                .get(&external_id)
                .cloned()
                .ok_or_else(|| {
                    DisbursementError::Rejected(format!(
                        "unknown disbursement {external_id}"
                    ))
                })
        }
    }
}
