//! Infrastructure Database Layer
//!
//! PostgreSQL implementations of the domain store ports using SQLx. The
//! crate follows the repository pattern: each domain crate defines its store
//! trait, and the implementation here hides connection pooling, SQL, and
//! error-code translation behind it.
//!
//! Invariants the schema carries for the domain:
//!
//! - `partners.user_id` is unique (one partner per auth identity)
//! - a partial unique index on `bank_accounts (partner_id) WHERE is_primary`
//!   backstops the atomic primary-account swap
//! - `payouts.id` is the primary key, so the request path's local mirror
//!   write is naturally idempotent against the trusted function's own write

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PgAuthAdapter;
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::{PgBankAccountStore, PgPartnerStore, PgPayoutStore};
