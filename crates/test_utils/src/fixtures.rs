//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the
//! marketplace core. These fixtures are designed to be consistent and
//! predictable for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use core_kernel::{
    BankAccountId, Currency, DisbursementId, KycDocumentId, Money, PartnerId, PayoutId, Session,
    UserId,
};
use domain_banking::{BankAccount, BankChannel};
use domain_partner::kyc::KycDocumentType;
use domain_partner::{KycDocument, Partner};
use domain_payout::{Payout, ScriptedExecutor};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A routine payout amount (IDR 250,000)
    pub fn idr_payout() -> Money {
        Money::new(dec!(250000), Currency::IDR)
    }

    /// A large payout amount (IDR 5,000,000)
    pub fn idr_large_payout() -> Money {
        Money::new(dec!(5000000), Currency::IDR)
    }

    /// A zero amount, rejected by every payout path
    pub fn idr_zero() -> Money {
        Money::zero(Currency::IDR)
    }

    /// A negative amount, rejected by every payout path
    pub fn idr_negative() -> Money {
        Money::new(dec!(-100000), Currency::IDR)
    }

    /// A USD amount for non-default-currency tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

static REFERENCE_INSTANT: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());

impl TemporalFixtures {
    /// A fixed reference instant (Jan 15, 2024, noon UTC)
    pub fn reference_instant() -> DateTime<Utc> {
        *REFERENCE_INSTANT
    }

    /// A session expiry comfortably in the future
    pub fn future_expiry() -> DateTime<Utc> {
        Utc::now() + Duration::hours(1)
    }

    /// A session expiry in the past
    pub fn past_expiry() -> DateTime<Utc> {
        Utc::now() - Duration::minutes(5)
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic user ID for testing
    pub fn user_id() -> UserId {
        UserId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic admin user ID for testing
    pub fn admin_user_id() -> UserId {
        UserId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic partner ID for testing
    pub fn partner_id() -> PartnerId {
        PartnerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic bank account ID for testing
    pub fn bank_account_id() -> BankAccountId {
        BankAccountId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }

    /// Creates a deterministic payout ID for testing
    pub fn payout_id() -> PayoutId {
        PayoutId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap())
    }

    /// Creates a deterministic disbursement ID for testing
    pub fn disbursement_id() -> DisbursementId {
        DisbursementId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440006").unwrap())
    }

    /// Creates a deterministic KYC document ID for testing
    pub fn kyc_document_id() -> KycDocumentId {
        KycDocumentId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440007").unwrap())
    }
}

/// Fixture for common string test data
pub struct StringFixtures;

impl StringFixtures {
    pub fn business_name() -> &'static str {
        "Bali Beats Collective"
    }

    pub fn contact_email() -> &'static str {
        "crew@balibeats.example"
    }

    pub fn holder_name() -> &'static str {
        "Dewi Lestari"
    }

    pub fn account_number() -> &'static str {
        "1234567890"
    }

    pub fn storage_path() -> &'static str {
        "kyc/550e8400/ktp-front.jpg"
    }
}

/// Fixture for session test data
pub struct SessionFixtures;

impl SessionFixtures {
    /// A live session for the given user
    pub fn live(user_id: UserId) -> Session {
        Session {
            user_id,
            bearer_token: format!("test-token-{user_id}"),
            expires_at: TemporalFixtures::future_expiry(),
        }
    }

    /// An already-expired session for the given user
    pub fn expired(user_id: UserId) -> Session {
        Session {
            user_id,
            bearer_token: format!("test-token-{user_id}"),
            expires_at: TemporalFixtures::past_expiry(),
        }
    }
}

/// Fixture for partner aggregates in each lifecycle state
pub struct PartnerFixtures;

impl PartnerFixtures {
    /// A freshly registered partner: Pending, KYC not started
    pub fn pending() -> Partner {
        Partner::new(
            IdFixtures::user_id(),
            StringFixtures::business_name(),
            StringFixtures::contact_email(),
        )
    }

    /// A partner approved without the KYC path (direct admin approval)
    pub fn approved() -> Partner {
        let mut partner = Self::pending();
        partner
            .approve(IdFixtures::admin_user_id())
            .expect("pending partner must be approvable");
        partner
    }

    /// A partner whose KYC review was approved: Verified and Approved
    pub fn verified() -> Partner {
        let mut partner = Self::pending();
        partner.submit_kyc().expect("fresh partner can submit KYC");
        partner
            .verify_kyc(IdFixtures::admin_user_id())
            .expect("pending review must be verifiable");
        partner
    }

    /// A suspended partner with the suspension noted
    pub fn suspended() -> Partner {
        let mut partner = Self::approved();
        partner
            .suspend("chargeback ratio exceeded threshold")
            .expect("approved partner must be suspendable");
        partner
    }
}

/// Fixture for bank accounts
pub struct BankAccountFixtures;

impl BankAccountFixtures {
    /// A non-primary BCA account for the fixture partner
    pub fn bca(partner_id: PartnerId) -> BankAccount {
        BankAccount::new(
            partner_id,
            BankChannel::Bca,
            StringFixtures::account_number(),
            StringFixtures::holder_name(),
        )
    }

    /// A primary Mandiri account for the fixture partner
    pub fn primary_mandiri(partner_id: PartnerId) -> BankAccount {
        let mut account = BankAccount::new(
            partner_id,
            BankChannel::Mandiri,
            "9876543210",
            StringFixtures::holder_name(),
        );
        account.is_primary = true;
        account
    }
}

/// Fixture for payout requests
pub struct PayoutFixtures;

impl PayoutFixtures {
    /// A freshly requested payout for the fixture partner
    pub fn requested(partner_id: PartnerId) -> Payout {
        Payout::new(partner_id, MoneyFixtures::idr_payout())
            .expect("fixture amount must be valid")
    }
}

/// Fixture for KYC documents
pub struct KycDocumentFixtures;

impl KycDocumentFixtures {
    /// An unreviewed national ID document
    pub fn national_id(partner_id: PartnerId) -> KycDocument {
        KycDocument::new(
            partner_id,
            KycDocumentType::NationalId,
            StringFixtures::storage_path(),
        )
    }
}

/// Fixture for scripted executors
pub struct ExecutorFixtures;

impl ExecutorFixtures {
    /// An executor that accepts the next request as Requested
    pub async fn accepting(payout_id: PayoutId) -> ScriptedExecutor {
        let executor = ScriptedExecutor::new();
        executor
            .push_receipt(payout_id, domain_payout::PayoutStatus::Requested)
            .await;
        executor
    }

    /// An executor that refuses the next request with an insufficient
    /// balance message
    pub async fn insufficient_balance() -> ScriptedExecutor {
        let executor = ScriptedExecutor::new();
        executor.push_rejection("Insufficient balance").await;
        executor
    }

    /// An executor whose next call dies in transit
    pub async fn unreachable() -> ScriptedExecutor {
        let executor = ScriptedExecutor::new();
        executor.push_invocation_failure().await;
        executor
    }
}
