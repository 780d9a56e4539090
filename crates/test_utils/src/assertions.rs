//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_banking::BankAccount;
use domain_partner::{KycStatus, Partner, PartnerStatus};
use domain_payout::{Payout, PayoutStatus};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than
/// the tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency().code(),
        expected.currency().code()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts a partner's full lifecycle state in one call
pub fn assert_partner_state(partner: &Partner, status: PartnerStatus, kyc_status: KycStatus) {
    assert_eq!(
        partner.status, status,
        "Partner status mismatch: expected {:?}, got {:?}",
        status, partner.status
    );
    assert_eq!(
        partner.kyc_status, kyc_status,
        "Partner KYC status mismatch: expected {:?}, got {:?}",
        kyc_status, partner.kyc_status
    );
    assert_eq!(
        partner.verified,
        kyc_status == KycStatus::Verified,
        "verified flag out of sync with KYC status {:?}",
        kyc_status
    );
}

/// Asserts that a payout sits in the expected state
pub fn assert_payout_status(payout: &Payout, expected: PayoutStatus) {
    assert_eq!(
        payout.status, expected,
        "Payout {} status mismatch: expected {:?}, got {:?}",
        payout.id, expected, payout.status
    );
}

/// Asserts that a payout reached a terminal state and will refuse further
/// transitions
pub fn assert_payout_terminal(payout: &Payout) {
    assert!(
        payout.is_terminal(),
        "Expected terminal payout, got {:?}",
        payout.status
    );
}

/// Asserts that at most one of the given accounts is primary
pub fn assert_single_primary(accounts: &[BankAccount]) {
    let primaries: Vec<_> = accounts.iter().filter(|a| a.is_primary).collect();
    assert!(
        primaries.len() <= 1,
        "Expected at most one primary account, found {}: {:?}",
        primaries.len(),
        primaries.iter().map(|a| a.id).collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{BankAccountBuilder, PartnerBuilder, PayoutBuilder};
    use crate::fixtures::IdFixtures;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_approx_eq_within_tolerance() {
        let a = Money::new(dec!(100.00), Currency::IDR);
        let b = Money::new(dec!(100.004), Currency::IDR);
        assert_money_approx_eq(&a, &b, dec!(0.01));
    }

    #[test]
    #[should_panic(expected = "Currency mismatch")]
    fn test_money_approx_eq_currency_mismatch_panics() {
        let a = Money::new(dec!(100), Currency::IDR);
        let b = Money::new(dec!(100), Currency::USD);
        assert_money_approx_eq(&a, &b, dec!(1));
    }

    #[test]
    fn test_partner_state_assertion() {
        let partner = PartnerBuilder::new().build();
        assert_partner_state(&partner, PartnerStatus::Pending, KycStatus::NotStarted);
    }

    #[test]
    #[should_panic(expected = "at most one primary")]
    fn test_single_primary_detects_violation() {
        let partner_id = IdFixtures::partner_id();
        let accounts = vec![
            BankAccountBuilder::new()
                .with_partner_id(partner_id)
                .primary()
                .build(),
            BankAccountBuilder::new()
                .with_partner_id(partner_id)
                .primary()
                .build(),
        ];
        assert_single_primary(&accounts);
    }

    #[test]
    fn test_payout_terminal_assertion() {
        let payout = PayoutBuilder::new()
            .with_status(PayoutStatus::Completed)
            .build();
        assert_payout_terminal(&payout);
    }
}
