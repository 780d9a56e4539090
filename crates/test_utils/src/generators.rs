//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::{Currency, Money, PartnerId, PayoutId, UserId};
use domain_banking::BankChannel;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::IDR),
        Just(Currency::USD),
        Just(Currency::SGD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::AUD),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating amounts that must be refused (zero or negative)
pub fn non_positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    -1_000_000_000i64..=0i64
}

/// Strategy for generating valid Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating positive IDR Money values
pub fn idr_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::IDR))
}

/// Strategy for generating Money values a payout must refuse
pub fn non_positive_money_strategy() -> impl Strategy<Value = Money> {
    (non_positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating valid commission percentages (0 to 100)
pub fn commission_percent_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=10000u32).prop_map(|n| Decimal::new(n as i64, 2))
}

/// Strategy for generating commission percentages outside the valid range
pub fn invalid_commission_percent_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (10001u32..100000u32).prop_map(|n| Decimal::new(n as i64, 2)),
        (1u32..100000u32).prop_map(|n| -Decimal::new(n as i64, 2)),
    ]
}

/// Strategy for generating valid disbursement channels
pub fn bank_channel_strategy() -> impl Strategy<Value = BankChannel> {
    prop_oneof![
        Just(BankChannel::Bca),
        Just(BankChannel::Bni),
        Just(BankChannel::Bri),
        Just(BankChannel::Mandiri),
        Just(BankChannel::Permata),
        Just(BankChannel::CimbNiaga),
    ]
}

/// Strategy for generating valid account numbers (5 to 20 digits)
pub fn account_number_strategy() -> impl Strategy<Value = String> {
    "[0-9]{5,20}"
}

/// Strategy for generating account numbers that fail validation
pub fn invalid_account_number_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}",
        "[0-9]{21,30}",
        "[0-9]{2,8}[a-zA-Z -][0-9]{2,8}",
    ]
}

/// Strategy for generating valid holder names (at least 2 characters)
pub fn holder_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{1,40}"
}

/// Strategy for generating UserId
pub fn user_id_strategy() -> impl Strategy<Value = UserId> {
    any::<[u8; 16]>().prop_map(|bytes| UserId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating PartnerId
pub fn partner_id_strategy() -> impl Strategy<Value = PartnerId> {
    any::<[u8; 16]>().prop_map(|bytes| PartnerId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating PayoutId
pub fn payout_id_strategy() -> impl Strategy<Value = PayoutId> {
    any::<[u8; 16]>().prop_map(|bytes| PayoutId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}
