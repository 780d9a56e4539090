//! The trusted intermediary boundary
//!
//! Partners never write payout rows directly. Every money-movement request
//! goes through a trusted function running with service-level credentials,
//! which re-validates the caller and applies the business rules before
//! touching the ledger. [`PayoutExecutor`] is that boundary as a trait: the
//! production implementation invokes the trusted function over HTTPS with
//! the caller's own bearer token, and tests script outcomes through
//! [`ScriptedExecutor`].
//!
//! The error split is the contract: `Rejected` is a structured refusal the
//! function computed (surface its message verbatim), `Invocation` is a
//! failure of the call itself. When an invocation error is transient the
//! outcome is unknown and callers must reconcile, not retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{BankAccountId, DomainPort, Money, PayoutId, PortError};

use crate::payout::PayoutStatus;

/// What the trusted function reports back for an accepted call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorReceipt {
    /// The payout the function created or acted on
    pub payout_id: PayoutId,
    pub status: PayoutStatus,
    pub message: Option<String>,
}

/// Errors crossing the executor boundary
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The function ran and refused the request; the message is surfaced
    /// to the caller verbatim
    #[error("{message}")]
    Rejected { message: String },

    /// The call itself failed; the function may or may not have run
    #[error(transparent)]
    Invocation(#[from] PortError),
}

impl ExecutorError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ExecutorError::Rejected {
            message: message.into(),
        }
    }

    /// True when the function may have executed despite the error
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, ExecutorError::Invocation(e) if e.is_outcome_unknown())
    }
}

/// Port to the trusted payout functions
#[async_trait]
pub trait PayoutExecutor: DomainPort {
    /// Asks the trusted function to create a payout request
    ///
    /// The caller's bearer token is forwarded so the function can verify
    /// the session itself; the executor adds no authority of its own.
    async fn request_payout(
        &self,
        amount: Money,
        bank_account_id: BankAccountId,
        bearer_token: &str,
    ) -> Result<ExecutorReceipt, ExecutorError>;

    /// Asks the trusted function to approve a payout and issue the
    /// disbursement
    async fn approve_payout(
        &self,
        payout_id: PayoutId,
        bearer_token: &str,
    ) -> Result<ExecutorReceipt, ExecutorError>;
}

/// Scripted test double for the executor boundary
#[cfg(any(test, feature = "mock"))]
pub mod scripted {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Executor that replays pre-loaded outcomes in order
    ///
    /// Each call pops the next scripted outcome; running out of script is a
    /// test bug and fails loudly with an internal error.
    #[derive(Debug, Default)]
    pub struct ScriptedExecutor {
        outcomes: Arc<Mutex<VecDeque<Result<ExecutorReceipt, ExecutorError>>>>,
        calls: Arc<Mutex<Vec<ExecutorCall>>>,
    }

    /// Record of one executor invocation, for assertions
    #[derive(Debug, Clone)]
    pub enum ExecutorCall {
        Request {
            amount: Money,
            bank_account_id: BankAccountId,
            bearer_token: String,
        },
        Approve {
            payout_id: PayoutId,
            bearer_token: String,
        },
    }

    impl ScriptedExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues the next outcome
        pub async fn push(&self, outcome: Result<ExecutorReceipt, ExecutorError>) {
            self.outcomes.lock().await.push_back(outcome);
        }

        /// Queues a successful receipt
        pub async fn push_receipt(&self, payout_id: PayoutId, status: PayoutStatus) {
            self.push(Ok(ExecutorReceipt {
                payout_id,
                status,
                message: None,
            }))
            .await;
        }

        /// Queues a structured rejection
        pub async fn push_rejection(&self, message: &str) {
            self.push(Err(ExecutorError::rejected(message))).await;
        }

        /// Queues a transport failure (outcome unknown)
        pub async fn push_invocation_failure(&self) {
            self.push(Err(ExecutorError::Invocation(PortError::connection(
                "connection reset by peer",
            ))))
            .await;
        }

        /// Calls observed so far
        pub async fn calls(&self) -> Vec<ExecutorCall> {
            self.calls.lock().await.clone()
        }

        async fn next(&self) -> Result<ExecutorReceipt, ExecutorError> {
            self.outcomes
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ExecutorError::Invocation(PortError::internal(
                        "scripted executor exhausted",
                    )))
                })
        }
    }

    impl DomainPort for ScriptedExecutor {}

    #[async_trait]
    impl PayoutExecutor for ScriptedExecutor {
        async fn request_payout(
            &self,
            amount: Money,
            bank_account_id: BankAccountId,
            bearer_token: &str,
        ) -> Result<ExecutorReceipt, ExecutorError> {
            self.calls.lock().await.push(ExecutorCall::Request {
                amount,
                bank_account_id,
                bearer_token: bearer_token.to_string(),
            });
            self.next().await
        }

        async fn approve_payout(
            &self,
            payout_id: PayoutId,
            bearer_token: &str,
        ) -> Result<ExecutorReceipt, ExecutorError> {
            self.calls.lock().await.push(ExecutorCall::Approve {
                payout_id,
                bearer_token: bearer_token.to_string(),
            });
            self.next().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_is_verbatim() {
        let err = ExecutorError::rejected("Insufficient balance");
        assert_eq!(err.to_string(), "Insufficient balance");
        assert!(!err.is_outcome_unknown());
    }

    #[test]
    fn test_transport_failure_is_outcome_unknown() {
        let dropped = ExecutorError::Invocation(PortError::connection("reset"));
        assert!(dropped.is_outcome_unknown());

        let denied = ExecutorError::Invocation(PortError::unauthorized("bad token"));
        assert!(!denied.is_outcome_unknown());
    }
}
