//! Cross-domain workflow tests
//!
//! These tests verify end-to-end scenarios that involve multiple crates
//! working together: onboarding a partner through KYC, registering a payout
//! destination, and moving a payout through the trusted-function and
//! webhook paths.

use std::sync::Arc;

use core_kernel::{MockAuthPort, MockPrivilegedAuth, Session, UserId};
use domain_banking::{AddBankAccountRequest, BankAccountManager, BankChannel, MockBankAccountStore};
use domain_partner::{
    KycDecision, KycDocumentType, MockPartnerStore, Partner, PartnerLifecycleManager,
    PartnerStore, RegisterPartnerRequest, SubmitDocument,
};
use domain_payout::{
    MockPayoutStore, PayoutError, PayoutManager, PayoutStatus, ScriptedExecutor,
};

use test_utils::assertions::{assert_partner_state, assert_payout_status, assert_single_primary};
use test_utils::builders::PartnerBuilder;
use test_utils::fixtures::{IdFixtures, MoneyFixtures};

/// Everything wired together over the in-memory ports
struct World {
    auth: Arc<MockAuthPort>,
    partners_store: Arc<MockPartnerStore>,
    executor: Arc<ScriptedExecutor>,
    partners: PartnerLifecycleManager,
    banking: BankAccountManager,
    payouts: PayoutManager,
}

impl World {
    fn new() -> Self {
        let auth = Arc::new(MockAuthPort::new());
        let partners_store = Arc::new(MockPartnerStore::new());
        let accounts_store = Arc::new(MockBankAccountStore::new());
        let payouts_store = Arc::new(MockPayoutStore::new());
        let executor = Arc::new(ScriptedExecutor::new());

        Self {
            auth: auth.clone(),
            partners_store: partners_store.clone(),
            executor: executor.clone(),
            partners: PartnerLifecycleManager::new(partners_store.clone(), auth.clone()),
            banking: BankAccountManager::new(
                accounts_store.clone(),
                partners_store.clone(),
                auth.clone(),
            ),
            payouts: PayoutManager::new(payouts_store, accounts_store, auth, executor.clone()),
        }
    }

    /// Seeds an auth identity plus a partner row owned by it
    async fn seed_partner(&self, partner: Partner) -> (Partner, Session) {
        let session = MockAuthPort::session_for(partner.user_id);
        self.auth
            .add_user_with_id(partner.user_id, &partner.contact_email, false)
            .await;
        self.partners_store
            .insert(&partner)
            .await
            .expect("seed partner");
        (partner, session)
    }

    async fn admin_session(&self) -> Session {
        let admin = self.auth.add_user("ops@marketplace.example", true).await;
        MockAuthPort::session_for(admin)
    }
}

fn owned_pending_partner() -> Partner {
    PartnerBuilder::new().with_user_id(UserId::new_v7()).build()
}

mod onboarding_workflow {
    use super::*;

    #[tokio::test]
    async fn test_registration_bootstraps_identity_and_pending_row() {
        let world = World::new();
        let privileged = MockPrivilegedAuth::new();

        let partner = world
            .partners
            .register_partner(
                &privileged,
                RegisterPartnerRequest {
                    business_name: "Bali Beats Collective".to_string(),
                    contact_email: "crew@balibeats.example".to_string(),
                    contact_phone: None,
                },
            )
            .await
            .expect("registration succeeds");

        assert_partner_state(
            &partner,
            domain_partner::PartnerStatus::Pending,
            domain_partner::KycStatus::NotStarted,
        );

        let identities = privileged.created_identities().await;
        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0].email, "crew@balibeats.example");
        assert_eq!(identities[0].id, partner.user_id);
    }

    #[tokio::test]
    async fn test_kyc_approval_records_approver() {
        let world = World::new();
        let (partner, session) = world.seed_partner(owned_pending_partner()).await;

        let submitted = world
            .partners
            .submit_kyc_documents(
                &session,
                vec![SubmitDocument {
                    document_type: KycDocumentType::NationalId,
                    storage_path: "kyc/ktp-front.jpg".to_string(),
                }],
            )
            .await
            .expect("submission succeeds");
        assert_partner_state(
            &submitted,
            domain_partner::PartnerStatus::Pending,
            domain_partner::KycStatus::PendingReview,
        );

        let admin_session = world.admin_session().await;
        let verified = world
            .partners
            .review_kyc(&admin_session, partner.id, KycDecision::Approve, None)
            .await
            .expect("review succeeds");

        assert_partner_state(
            &verified,
            domain_partner::PartnerStatus::Approved,
            domain_partner::KycStatus::Verified,
        );
        assert_eq!(verified.approved_by, Some(admin_session.user_id));
        assert!(verified.approved_at.is_some());
    }

    #[tokio::test]
    async fn test_kyc_rejection_returns_to_pending() {
        let world = World::new();
        let (partner, session) = world.seed_partner(owned_pending_partner()).await;

        world
            .partners
            .submit_kyc_documents(
                &session,
                vec![SubmitDocument {
                    document_type: KycDocumentType::BankStatement,
                    storage_path: "kyc/statement.pdf".to_string(),
                }],
            )
            .await
            .expect("submission succeeds");

        let admin_session = world.admin_session().await;
        let rejected = world
            .partners
            .review_kyc(
                &admin_session,
                partner.id,
                KycDecision::Reject,
                Some("document illegible".to_string()),
            )
            .await
            .expect("review succeeds");

        assert_partner_state(
            &rejected,
            domain_partner::PartnerStatus::Pending,
            domain_partner::KycStatus::Rejected,
        );
        assert_eq!(rejected.rejection_reason.as_deref(), Some("document illegible"));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_review() {
        let world = World::new();
        let (partner, session) = world.seed_partner(owned_pending_partner()).await;

        world
            .partners
            .submit_kyc_documents(
                &session,
                vec![SubmitDocument {
                    document_type: KycDocumentType::NationalId,
                    storage_path: "kyc/ktp.jpg".to_string(),
                }],
            )
            .await
            .expect("submission succeeds");

        let err = world
            .partners
            .review_kyc(&session, partner.id, KycDecision::Approve, None)
            .await
            .expect_err("owner is not an admin");
        assert!(matches!(err, domain_partner::PartnerError::Forbidden));
    }
}

mod payout_workflow {
    use super::*;

    async fn verified_partner_with_primary_account(world: &World) -> (Partner, Session) {
        let partner = PartnerBuilder::new()
            .with_user_id(UserId::new_v7())
            .with_status(domain_partner::PartnerStatus::Approved)
            .build();
        let (partner, session) = world.seed_partner(partner).await;

        world
            .banking
            .add_bank_account(
                &session,
                AddBankAccountRequest {
                    channel: BankChannel::Bca,
                    account_number: "1234567890".to_string(),
                    holder_name: "Dewi Lestari".to_string(),
                    make_primary: true,
                },
            )
            .await
            .expect("account registers");

        (partner, session)
    }

    #[tokio::test]
    async fn test_payout_through_webhook_lifecycle() {
        let world = World::new();
        let (partner, session) = verified_partner_with_primary_account(&world).await;

        let payout_id = IdFixtures::payout_id();
        world
            .executor
            .push_receipt(payout_id, PayoutStatus::Requested)
            .await;

        let payout = world
            .payouts
            .request_payout(&session, partner.id, MoneyFixtures::idr_payout())
            .await
            .expect("request succeeds");
        assert_eq!(payout.id, payout_id);
        assert_payout_status(&payout, PayoutStatus::Requested);

        // Provider webhook: issued, then completed
        let processing = world
            .payouts
            .mark_processing(payout_id, IdFixtures::disbursement_id())
            .await
            .expect("processing transition");
        assert_payout_status(&processing, PayoutStatus::Processing);

        let completed = world
            .payouts
            .mark_completed(payout_id)
            .await
            .expect("completed transition");
        assert_payout_status(&completed, PayoutStatus::Completed);

        // Redelivered webhook is a no-op
        let replayed = world
            .payouts
            .mark_completed(payout_id)
            .await
            .expect("terminal replay is idempotent");
        assert_eq!(replayed.completed_at, completed.completed_at);
    }

    #[tokio::test]
    async fn test_rejection_message_surfaces_verbatim() {
        let world = World::new();
        let (partner, session) = verified_partner_with_primary_account(&world).await;

        world.executor.push_rejection("Insufficient balance").await;

        let err = world
            .payouts
            .request_payout(&session, partner.id, MoneyFixtures::idr_large_payout())
            .await
            .expect_err("the trusted function refuses");
        assert!(matches!(err, PayoutError::Rejected(msg) if msg == "Insufficient balance"));
    }

    #[tokio::test]
    async fn test_no_primary_account_refused_before_executor() {
        let world = World::new();
        let partner = PartnerBuilder::new()
            .with_user_id(UserId::new_v7())
            .with_status(domain_partner::PartnerStatus::Approved)
            .build();
        let (partner, session) = world.seed_partner(partner).await;

        let err = world
            .payouts
            .request_payout(&session, partner.id, MoneyFixtures::idr_payout())
            .await
            .expect_err("no destination registered");
        assert!(matches!(err, PayoutError::NoPrimaryBankAccount));
        assert!(world.executor.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_primary_swap_keeps_single_primary() {
        let world = World::new();
        let (_partner, session) = verified_partner_with_primary_account(&world).await;

        let second = world
            .banking
            .add_bank_account(
                &session,
                AddBankAccountRequest {
                    channel: BankChannel::Mandiri,
                    account_number: "9876543210".to_string(),
                    holder_name: "Dewi Lestari".to_string(),
                    make_primary: false,
                },
            )
            .await
            .expect("second account registers");

        world
            .banking
            .set_primary_bank_account(&session, second.id)
            .await
            .expect("swap succeeds");

        let accounts = world
            .banking
            .list_bank_accounts(&session)
            .await
            .expect("listing succeeds");
        assert_single_primary(&accounts);
        let primary = accounts.iter().find(|a| a.is_primary).expect("one primary");
        assert_eq!(primary.id, second.id);
    }
}
