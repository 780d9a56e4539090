//! Payout Manager
//!
//! Orchestrates the payout pipeline: partner requests go to the trusted
//! executor with the caller's own bearer token, admin approvals are
//! re-verified against the identity store, and the webhook path applies
//! provider outcomes as guarded single-row patches.
//!
//! Two properties are load-bearing here:
//!
//! - A structured refusal from the executor is returned to the caller with
//!   its message untouched ("Insufficient balance" arrives as exactly
//!   "Insufficient balance").
//! - A transport failure on an outbound call maps to
//!   [`PayoutError::OutcomeUnknown`], never to a plain rejection, because
//!   the money may already be moving.

use std::sync::Arc;

use tracing::warn;

use core_kernel::{AuthPort, DisbursementId, Money, PartnerId, PayoutId, Session};
use domain_banking::BankAccountStore;

use crate::error::PayoutError;
use crate::executor::{ExecutorError, ExecutorReceipt, PayoutExecutor};
use crate::payout::Payout;
use crate::ports::{PayoutPatch, PayoutStore};

/// Application service for payouts
pub struct PayoutManager {
    payouts: Arc<dyn PayoutStore>,
    bank_accounts: Arc<dyn BankAccountStore>,
    auth: Arc<dyn AuthPort>,
    executor: Arc<dyn PayoutExecutor>,
}

impl PayoutManager {
    pub fn new(
        payouts: Arc<dyn PayoutStore>,
        bank_accounts: Arc<dyn BankAccountStore>,
        auth: Arc<dyn AuthPort>,
        executor: Arc<dyn PayoutExecutor>,
    ) -> Self {
        Self {
            payouts,
            bank_accounts,
            auth,
            executor,
        }
    }

    /// Partner requests a payout of `amount` to their primary bank account
    ///
    /// The amount is checked before anything else touches a store; a
    /// non-positive amount writes nothing anywhere. The partner must have a
    /// primary bank account. The actual request runs inside the trusted
    /// function under the caller's bearer token; on success the resulting
    /// payout row is mirrored into the local store for the webhook path.
    pub async fn request_payout(
        &self,
        session: &Session,
        partner_id: PartnerId,
        amount: Money,
    ) -> Result<Payout, PayoutError> {
        if !amount.is_positive() {
            return Err(PayoutError::InvalidAmount(amount.amount()));
        }

        self.require_session(session).await?;

        let primary = self
            .bank_accounts
            .find_primary(partner_id)
            .await?
            .ok_or(PayoutError::NoPrimaryBankAccount)?;

        let receipt = self
            .executor
            .request_payout(amount, primary.id, &session.bearer_token)
            .await
            .map_err(map_executor_error)?;

        let payout = Payout::with_id(receipt.payout_id, partner_id, amount)?;
        if let Err(e) = self.payouts.insert(&payout).await {
            // The trusted function may have written the row first; a replay
            // of the same id is fine, anything else is a real failure
            if !matches!(e, core_kernel::PortError::Conflict { .. }) {
                return Err(PayoutError::Store(e));
            }
        }

        Ok(payout)
    }

    /// Admin approves a payout, triggering the disbursement
    ///
    /// The admin role is re-read from the identity store for this call.
    /// Terminal payouts are refused locally before the executor is invoked.
    pub async fn approve_payout(
        &self,
        session: &Session,
        payout_id: PayoutId,
    ) -> Result<ExecutorReceipt, PayoutError> {
        self.require_admin(session).await?;

        let payout = self.get_payout(payout_id).await?;
        if payout.is_terminal() {
            return Err(PayoutError::invalid_transition(format!(
                "payout {} is already {}",
                payout.id, payout.status
            )));
        }

        self.executor
            .approve_payout(payout_id, &session.bearer_token)
            .await
            .map_err(|e| {
                if e.is_outcome_unknown() {
                    warn!(payout_id = %payout_id, "payout approval outcome unknown");
                }
                map_executor_error(e)
            })
    }

    /// Admin rejects a payout with a reason
    pub async fn reject_payout(
        &self,
        session: &Session,
        payout_id: PayoutId,
        reason: &str,
    ) -> Result<Payout, PayoutError> {
        self.require_admin(session).await?;
        let mut payout = self.get_payout(payout_id).await?;
        payout.reject(reason)?;
        self.persist(&payout).await
    }

    /// Webhook: the provider accepted the disbursement
    pub async fn mark_processing(
        &self,
        payout_id: PayoutId,
        disbursement_id: DisbursementId,
    ) -> Result<Payout, PayoutError> {
        let mut payout = self.get_payout(payout_id).await?;
        payout.mark_processing(disbursement_id)?;
        self.persist(&payout).await
    }

    /// Webhook: the provider confirmed the transfer landed
    pub async fn mark_completed(&self, payout_id: PayoutId) -> Result<Payout, PayoutError> {
        let mut payout = self.get_payout(payout_id).await?;
        payout.mark_completed()?;
        self.persist(&payout).await
    }

    /// Webhook: the provider reported the transfer failed
    pub async fn mark_failed(
        &self,
        payout_id: PayoutId,
        reason: &str,
    ) -> Result<Payout, PayoutError> {
        let mut payout = self.get_payout(payout_id).await?;
        payout.reject(reason)?;
        self.persist(&payout).await
    }

    /// A partner's payouts, newest first
    pub async fn payouts_for_partner(
        &self,
        session: &Session,
        partner_id: PartnerId,
    ) -> Result<Vec<Payout>, PayoutError> {
        self.require_session(session).await?;
        Ok(self.payouts.list_for_partner(partner_id).await?)
    }

    async fn get_payout(&self, id: PayoutId) -> Result<Payout, PayoutError> {
        self.payouts.get(id).await.map_err(|e| {
            if e.is_not_found() {
                PayoutError::not_found(id)
            } else {
                PayoutError::Store(e)
            }
        })
    }

    async fn persist(&self, payout: &Payout) -> Result<Payout, PayoutError> {
        Ok(self
            .payouts
            .update(payout.id, PayoutPatch::from_payout(payout))
            .await?)
    }

    async fn require_session(&self, session: &Session) -> Result<(), PayoutError> {
        if session.is_expired() {
            return Err(PayoutError::unauthorized("session expired"));
        }
        if !self.auth.verify_session(session).await? {
            return Err(PayoutError::unauthorized("invalid session"));
        }
        Ok(())
    }

    /// The role flag is re-read from the identity store on every call
    async fn require_admin(&self, session: &Session) -> Result<(), PayoutError> {
        self.require_session(session).await?;
        if !self.auth.is_admin(session.user_id).await? {
            return Err(PayoutError::Forbidden);
        }
        Ok(())
    }
}

fn map_executor_error(error: ExecutorError) -> PayoutError {
    match error {
        ExecutorError::Rejected { message } => PayoutError::Rejected(message),
        ExecutorError::Invocation(e) if e.is_outcome_unknown() => {
            PayoutError::OutcomeUnknown(e.to_string())
        }
        ExecutorError::Invocation(e) => PayoutError::Store(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, MockAuthPort, PortError, UserId};
    use domain_banking::{BankAccount, BankChannel, MockBankAccountStore};
    use rust_decimal_macros::dec;

    use crate::executor::scripted::{ExecutorCall, ScriptedExecutor};
    use crate::payout::PayoutStatus;
    use crate::ports::mock::MockPayoutStore;

    struct Harness {
        manager: PayoutManager,
        payouts: Arc<MockPayoutStore>,
        bank_accounts: Arc<MockBankAccountStore>,
        executor: Arc<ScriptedExecutor>,
        auth: Arc<MockAuthPort>,
        partner_id: PartnerId,
        owner: UserId,
    }

    async fn harness() -> Harness {
        let auth = Arc::new(MockAuthPort::new());
        let owner = auth.add_user("organizer@example.com", false).await;
        let payouts = Arc::new(MockPayoutStore::new());
        let bank_accounts = Arc::new(MockBankAccountStore::new());
        let executor = Arc::new(ScriptedExecutor::new());

        Harness {
            manager: PayoutManager::new(
                payouts.clone(),
                bank_accounts.clone(),
                auth.clone(),
                executor.clone(),
            ),
            payouts,
            bank_accounts,
            executor,
            auth,
            partner_id: PartnerId::new(),
            owner,
        }
    }

    async fn add_primary_account(h: &Harness) -> BankAccount {
        let mut account =
            BankAccount::new(h.partner_id, BankChannel::Bca, "1234567890", "Owner");
        account.is_primary = true;
        h.bank_accounts.insert(&account).await.unwrap();
        account
    }

    fn idr(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::IDR)
    }

    #[tokio::test]
    async fn test_request_payout_happy_path() {
        let h = harness().await;
        let account = add_primary_account(&h).await;
        let expected_id = PayoutId::new_v7();
        h.executor
            .push_receipt(expected_id, PayoutStatus::Requested)
            .await;

        let session = MockAuthPort::session_for(h.owner);
        let payout = h
            .manager
            .request_payout(&session, h.partner_id, idr(dec!(500000)))
            .await
            .unwrap();

        assert_eq!(payout.id, expected_id);
        assert_eq!(payout.status, PayoutStatus::Requested);
        assert_eq!(h.payouts.count().await, 1);

        // The executor saw the primary account and the caller's own token
        let calls = h.executor.calls().await;
        match &calls[0] {
            ExecutorCall::Request {
                bank_account_id,
                bearer_token,
                ..
            } => {
                assert_eq!(*bank_account_id, account.id);
                assert_eq!(*bearer_token, session.bearer_token);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_positive_amount_writes_nothing() {
        let h = harness().await;
        add_primary_account(&h).await;
        let session = MockAuthPort::session_for(h.owner);

        for amount in [idr(dec!(0)), idr(dec!(-250000))] {
            let err = h
                .manager
                .request_payout(&session, h.partner_id, amount)
                .await
                .unwrap_err();
            assert!(matches!(err, PayoutError::InvalidAmount(_)));
        }

        assert_eq!(h.payouts.count().await, 0);
        assert!(h.executor.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_primary_account_is_a_precondition() {
        let h = harness().await;
        let session = MockAuthPort::session_for(h.owner);

        let err = h
            .manager
            .request_payout(&session, h.partner_id, idr(dec!(100000)))
            .await
            .unwrap_err();
        assert!(matches!(err, PayoutError::NoPrimaryBankAccount));
        assert!(h.executor.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejection_message_propagates_verbatim() {
        let h = harness().await;
        add_primary_account(&h).await;
        h.executor.push_rejection("Insufficient balance").await;

        let session = MockAuthPort::session_for(h.owner);
        let err = h
            .manager
            .request_payout(&session, h.partner_id, idr(dec!(9000000)))
            .await
            .unwrap_err();

        match err {
            PayoutError::Rejected(message) => assert_eq!(message, "Insufficient balance"),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(h.payouts.count().await, 0);
    }

    #[tokio::test]
    async fn test_invocation_failure_is_outcome_unknown() {
        let h = harness().await;
        add_primary_account(&h).await;
        h.executor.push_invocation_failure().await;

        let session = MockAuthPort::session_for(h.owner);
        let err = h
            .manager
            .request_payout(&session, h.partner_id, idr(dec!(100000)))
            .await
            .unwrap_err();

        assert!(err.is_outcome_unknown());
        assert!(!matches!(err, PayoutError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_approval_requires_admin_role() {
        let h = harness().await;
        let payout = Payout::new(h.partner_id, idr(dec!(300000))).unwrap();
        h.payouts.insert(&payout).await.unwrap();

        let session = MockAuthPort::session_for(h.owner);
        let err = h
            .manager
            .approve_payout(&session, payout.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PayoutError::Forbidden));
        assert!(h.executor.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_terminal_payout_cannot_be_reapproved() {
        let h = harness().await;
        let mut payout = Payout::new(h.partner_id, idr(dec!(300000))).unwrap();
        payout.reject("fraud hold").unwrap();
        h.payouts.insert(&payout).await.unwrap();

        let admin = h.auth.add_user("admin@platform.example", true).await;
        let session = MockAuthPort::session_for(admin);

        let err = h
            .manager
            .approve_payout(&session, payout.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PayoutError::InvalidTransition(_)));
        // The executor was never invoked for a dead payout
        assert!(h.executor.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_webhook_pipeline_processing_then_completed() {
        let h = harness().await;
        let payout = Payout::new(h.partner_id, idr(dec!(450000))).unwrap();
        h.payouts.insert(&payout).await.unwrap();

        let disbursement = DisbursementId::new();
        let processing = h
            .manager
            .mark_processing(payout.id, disbursement)
            .await
            .unwrap();
        assert_eq!(processing.status, PayoutStatus::Processing);

        // Webhook replay of the same disbursement
        h.manager
            .mark_processing(payout.id, disbursement)
            .await
            .unwrap();

        let completed = h.manager.mark_completed(payout.id).await.unwrap();
        assert_eq!(completed.status, PayoutStatus::Completed);

        // Completion replay is idempotent too
        let replay = h.manager.mark_completed(payout.id).await.unwrap();
        assert_eq!(replay.status, PayoutStatus::Completed);
    }

    #[tokio::test]
    async fn test_admin_approval_invocation_failure_flagged_unknown() {
        let h = harness().await;
        let payout = Payout::new(h.partner_id, idr(dec!(300000))).unwrap();
        h.payouts.insert(&payout).await.unwrap();
        h.executor
            .push(Err(ExecutorError::Invocation(PortError::Timeout {
                operation: "approve_payout".to_string(),
                duration_ms: 10000,
            })))
            .await;

        let admin = h.auth.add_user("admin@platform.example", true).await;
        let session = MockAuthPort::session_for(admin);

        let err = h
            .manager
            .approve_payout(&session, payout.id)
            .await
            .unwrap_err();
        assert!(err.is_outcome_unknown());
    }
}
