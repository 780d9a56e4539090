//! Comprehensive tests for domain_partner

use rust_decimal_macros::dec;

use core_kernel::UserId;

use domain_partner::kyc::{KycDocument, KycDocumentType, KycStatus};
use domain_partner::partner::{Partner, PartnerStatus, Pricing};
use domain_partner::PartnerError;

fn registered_partner() -> Partner {
    Partner::new(UserId::new(), "Yogyakarta Arts Fest", "hello@yaf.example")
}

// ============================================================================
// Account status machine
// ============================================================================

mod status_machine {
    use super::*;

    #[test]
    fn full_lifecycle_pending_to_reactivated() {
        let admin = UserId::new();
        let mut p = registered_partner();

        p.approve(admin).unwrap();
        p.suspend("payout dispute").unwrap();
        p.reactivate().unwrap();

        assert_eq!(p.status, PartnerStatus::Approved);
        assert!(p.can_operate());
        assert!(p.admin_notes.is_none());
    }

    #[test]
    fn every_illegal_edge_is_refused() {
        let admin = UserId::new();

        // From Pending: suspend and reactivate are illegal
        let mut pending = registered_partner();
        assert!(pending.suspend("x").is_err());
        assert!(pending.reactivate().is_err());

        // From Approved: approve and reject are illegal
        let mut approved = registered_partner();
        approved.approve(admin).unwrap();
        assert!(approved.approve(admin).is_err());
        assert!(approved.reject("x").is_err());
        assert!(approved.reactivate().is_err());

        // From Rejected: everything but a fresh KYC run is illegal
        let mut rejected = registered_partner();
        rejected.reject("incomplete").unwrap();
        assert!(rejected.approve(admin).is_err());
        assert!(rejected.suspend("x").is_err());
        assert!(rejected.reactivate().is_err());

        // From Suspended: only reactivate is legal
        let mut suspended = registered_partner();
        suspended.approve(admin).unwrap();
        suspended.suspend("x").unwrap();
        assert!(suspended.approve(admin).is_err());
        assert!(suspended.reject("x").is_err());
        assert!(suspended.suspend("again").is_err());
    }

    #[test]
    fn failed_transition_leaves_aggregate_untouched() {
        let mut p = registered_partner();
        let before = p.clone();

        assert!(p.suspend("nope").is_err());

        assert_eq!(p.status, before.status);
        assert_eq!(p.admin_notes, before.admin_notes);
        assert_eq!(p.updated_at, before.updated_at);
    }
}

// ============================================================================
// KYC axis
// ============================================================================

mod kyc_review {
    use super::*;

    #[test]
    fn verified_implies_approved_and_flag_set() {
        let admin = UserId::new();
        let mut p = registered_partner();
        p.submit_kyc().unwrap();
        p.verify_kyc(admin).unwrap();

        assert_eq!(p.kyc_status, KycStatus::Verified);
        assert_eq!(p.status, PartnerStatus::Approved);
        assert!(p.verified);
        assert_eq!(p.approved_by, Some(admin));
        assert!(p.approved_at.is_some());
    }

    #[test]
    fn rejected_review_never_leaves_account_approved() {
        let mut p = registered_partner();
        p.submit_kyc().unwrap();
        p.reject_kyc("name mismatch with bank records").unwrap();

        assert_eq!(p.kyc_status, KycStatus::Rejected);
        assert_eq!(p.status, PartnerStatus::Pending);
        assert!(!p.verified);
    }

    #[test]
    fn verified_flag_tracks_kyc_status() {
        let mut p = registered_partner();
        assert_eq!(p.verified, p.kyc_status == KycStatus::Verified);

        p.submit_kyc().unwrap();
        assert_eq!(p.verified, p.kyc_status == KycStatus::Verified);

        p.verify_kyc(UserId::new()).unwrap();
        assert_eq!(p.verified, p.kyc_status == KycStatus::Verified);
    }

    #[test]
    fn double_submission_is_refused() {
        let mut p = registered_partner();
        p.submit_kyc().unwrap();
        let err = p.submit_kyc().unwrap_err();
        assert!(matches!(err, PartnerError::InvalidTransition(_)));
    }

    #[test]
    fn document_records_carry_storage_paths_not_urls() {
        let doc = KycDocument::new(
            registered_partner().id,
            KycDocumentType::BankStatement,
            "kyc/yaf/statement-2026-07.pdf",
        );
        assert!(!doc.storage_path.starts_with("http"));
        assert!(doc.reviewed_by.is_none());
    }
}

// ============================================================================
// Pricing
// ============================================================================

mod pricing {
    use super::*;

    #[test]
    fn standard_commission_applies_fifteen_percent() {
        use core_kernel::{Currency, Money};

        let gross = Money::new(dec!(1000000), Currency::IDR);
        let fee = Pricing::Standard.commission_rate().apply(&gross);
        assert_eq!(fee.amount(), dec!(150000));
    }

    #[test]
    fn custom_rate_boundaries_are_inclusive() {
        assert!(Pricing::custom(dec!(0)).is_ok());
        assert!(Pricing::custom(dec!(100)).is_ok());
        assert!(Pricing::custom(dec!(100.01)).is_err());
        assert!(Pricing::custom(dec!(-1)).is_err());
    }

    #[test]
    fn reset_after_custom_restores_standard_rate() {
        let mut p = registered_partner();
        p.set_custom_pricing(dec!(8)).unwrap();
        p.reset_to_standard_pricing();
        assert_eq!(p.pricing.commission_percent(), dec!(15));
    }
}
