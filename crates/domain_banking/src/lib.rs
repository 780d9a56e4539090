//! Banking Domain
//!
//! Disbursement destinations for partners. Each partner registers one or
//! more bank accounts; payouts are always sent to the single primary
//! account. The single-primary invariant is enforced at the store boundary
//! with an atomic conditional swap rather than an unmark-then-mark pair.

pub mod bank_account;
pub mod error;
pub mod manager;
pub mod ports;

pub use bank_account::{BankAccount, BankChannel};
pub use error::{BankingError, FieldError};
pub use manager::{AddBankAccountRequest, BankAccountManager};
pub use ports::BankAccountStore;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockBankAccountStore;
