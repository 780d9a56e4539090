//! PostgreSQL implementations of the domain store ports

pub mod bank_account;
pub mod partner;
pub mod payout;

pub use bank_account::PgBankAccountStore;
pub use partner::PgPartnerStore;
pub use payout::PgPayoutStore;
