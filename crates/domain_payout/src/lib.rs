//! Payout Domain
//!
//! Moves partner revenue out of the platform. A payout walks a one-way
//! state machine (requested, processing, completed, with rejected as the
//! failure exit) driven from two sides: admins act through the trusted
//! function boundary, and the disbursement provider reports progress back
//! through webhooks.
//!
//! Two boundaries keep money movement honest:
//!
//! - [`PayoutExecutor`] is the trusted intermediary. Partners and admins
//!   never write payout rows themselves; the executor forwards their own
//!   bearer token to a server-side function that re-validates everything.
//! - [`DisbursementProvider`] is the external transfer API, idempotent on
//!   an `external_id` so an unknown outcome is reconciled, never reissued.

pub mod adapters;
pub mod disbursement;
pub mod error;
pub mod executor;
pub mod manager;
pub mod payout;
pub mod ports;

pub use adapters::{
    HttpDisbursementConfig, HttpDisbursementProvider, TrustedFunctionClient,
    TrustedFunctionConfig,
};
pub use disbursement::{
    Disbursement, DisbursementError, DisbursementProvider, DisbursementRequest,
    DisbursementStatus,
};
pub use error::PayoutError;
pub use executor::{ExecutorError, ExecutorReceipt, PayoutExecutor};
pub use manager::PayoutManager;
pub use payout::{Payout, PayoutStatus};
pub use ports::{PayoutPatch, PayoutStore};

#[cfg(any(test, feature = "mock"))]
pub use disbursement::mock::MockDisbursementProvider;
#[cfg(any(test, feature = "mock"))]
pub use executor::scripted::{ExecutorCall, ScriptedExecutor};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPayoutStore;
