//! Integration tests for the payout state machine and error taxonomy

use core_kernel::{Currency, DisbursementId, Money, PartnerId, PortError};
use domain_payout::{ExecutorError, Payout, PayoutError, PayoutStatus};
use rust_decimal_macros::dec;

fn payout(amount: rust_decimal::Decimal) -> Payout {
    Payout::new(PartnerId::new(), Money::new(amount, Currency::IDR)).unwrap()
}

mod state_machine {
    use super::*;

    #[test]
    fn test_new_payout_starts_requested() {
        let p = payout(dec!(1500000));
        assert_eq!(p.status, PayoutStatus::Requested);
        assert!(p.disbursement_id.is_none());
        assert!(p.rejection_reason.is_none());
        assert!(!p.is_terminal());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut p = payout(dec!(1500000));
        let disbursement = DisbursementId::new();

        p.mark_processing(disbursement).unwrap();
        assert_eq!(p.status, PayoutStatus::Processing);
        assert_eq!(p.disbursement_id, Some(disbursement));

        p.mark_completed().unwrap();
        assert_eq!(p.status, PayoutStatus::Completed);
        assert!(p.completed_at.is_some());
        assert!(p.is_terminal());
    }

    #[test]
    fn test_every_illegal_edge_is_refused() {
        // Requested cannot complete directly
        let mut p = payout(dec!(100000));
        assert!(p.mark_completed().is_err());

        // Completed cannot be rejected or re-processed
        let mut done = payout(dec!(100000));
        done.mark_processing(DisbursementId::new()).unwrap();
        done.mark_completed().unwrap();
        assert!(done.reject("late rejection").is_err());
        assert!(done.mark_processing(DisbursementId::new()).is_err());

        // Rejected cannot progress
        let mut refused = payout(dec!(100000));
        refused.reject("Insufficient balance").unwrap();
        assert!(refused.mark_processing(DisbursementId::new()).is_err());
        assert!(refused.mark_completed().is_err());
    }

    #[test]
    fn test_failed_transition_leaves_payout_untouched() {
        let mut p = payout(dec!(100000));
        p.reject("admin refused").unwrap();
        let before = p.clone();

        assert!(p.mark_processing(DisbursementId::new()).is_err());

        assert_eq!(p.status, before.status);
        assert_eq!(p.disbursement_id, before.disbursement_id);
        assert_eq!(p.rejection_reason, before.rejection_reason);
        assert_eq!(p.updated_at, before.updated_at);
    }

    #[test]
    fn test_reject_allowed_from_both_live_states() {
        let mut requested = payout(dec!(100000));
        requested.reject("never approved").unwrap();
        assert_eq!(requested.status, PayoutStatus::Rejected);

        let mut processing = payout(dec!(100000));
        processing.mark_processing(DisbursementId::new()).unwrap();
        processing.reject("provider failure").unwrap();
        assert_eq!(processing.status, PayoutStatus::Rejected);
        // The disbursement reference survives for reconciliation
        assert!(processing.disbursement_id.is_some());
    }
}

mod terminal_idempotency {
    use super::*;

    #[test]
    fn test_completed_replay_is_noop() {
        let mut p = payout(dec!(100000));
        p.mark_processing(DisbursementId::new()).unwrap();
        p.mark_completed().unwrap();
        let stamp = p.completed_at;

        p.mark_completed().unwrap();
        assert_eq!(p.completed_at, stamp);
    }

    #[test]
    fn test_rejected_replay_keeps_first_reason() {
        let mut p = payout(dec!(100000));
        p.reject("Insufficient balance").unwrap();
        p.reject("Account frozen").unwrap();
        assert_eq!(p.rejection_reason.as_deref(), Some("Insufficient balance"));
    }

    #[test]
    fn test_processing_replay_distinguishes_disbursements() {
        let disbursement = DisbursementId::new();
        let mut p = payout(dec!(100000));
        p.mark_processing(disbursement).unwrap();

        // At-least-once delivery of the same event
        assert!(p.mark_processing(disbursement).is_ok());
        // A second disbursement for the same payout is never silent
        assert!(p.mark_processing(DisbursementId::new()).is_err());
    }
}

mod amounts {
    use super::*;

    #[test]
    fn test_amount_must_be_strictly_positive() {
        for bad in [dec!(0), dec!(-1), dec!(-250000.50)] {
            let result = Payout::new(PartnerId::new(), Money::new(bad, Currency::IDR));
            assert!(matches!(result, Err(PayoutError::InvalidAmount(_))));
        }

        assert!(Payout::new(PartnerId::new(), Money::new(dec!(0.01), Currency::IDR)).is_ok());
    }

    #[test]
    fn test_with_id_validates_amount_too() {
        let id = core_kernel::PayoutId::new_v7();
        let result = Payout::with_id(id, PartnerId::new(), Money::zero(Currency::IDR));
        assert!(matches!(result, Err(PayoutError::InvalidAmount(_))));

        let ok = Payout::with_id(id, PartnerId::new(), Money::new(dec!(5000), Currency::IDR))
            .unwrap();
        assert_eq!(ok.id, id);
    }
}

mod error_taxonomy {
    use super::*;

    #[test]
    fn test_rejection_messages_surface_verbatim() {
        let executor = ExecutorError::rejected("Insufficient balance");
        assert_eq!(executor.to_string(), "Insufficient balance");

        let domain = PayoutError::Rejected("Insufficient balance".to_string());
        assert_eq!(domain.to_string(), "Insufficient balance");
    }

    #[test]
    fn test_only_transient_invocations_are_outcome_unknown() {
        let timeout = ExecutorError::Invocation(PortError::Timeout {
            operation: "approve-payout".to_string(),
            duration_ms: 15000,
        });
        assert!(timeout.is_outcome_unknown());

        let connection = ExecutorError::Invocation(PortError::connection("reset by peer"));
        assert!(connection.is_outcome_unknown());

        let unauthorized = ExecutorError::Invocation(PortError::unauthorized("bad token"));
        assert!(!unauthorized.is_outcome_unknown());

        let rejected = ExecutorError::rejected("Insufficient balance");
        assert!(!rejected.is_outcome_unknown());
    }

    #[test]
    fn test_outcome_unknown_classification_on_domain_error() {
        assert!(PayoutError::OutcomeUnknown("approve-payout timed out".to_string())
            .is_outcome_unknown());
        assert!(!PayoutError::NoPrimaryBankAccount.is_outcome_unknown());
        assert!(!PayoutError::Forbidden.is_outcome_unknown());
    }
}
