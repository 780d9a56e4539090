//! Partner Lifecycle Domain
//!
//! Partners are event organizers selling tickets through the marketplace.
//! This crate owns the partner aggregate and its two state axes (account
//! status and KYC review), the pricing scheme, and the
//! `PartnerLifecycleManager` application service that drives them.
//!
//! # State machine
//!
//! ```text
//! account:  Pending ──→ Approved ──→ Suspended
//!              │  ▲         ▲            │
//!              │  └─────────┼────────────┘  (reactivate)
//!              ▼            │
//!           Rejected        │
//!                           │
//! kyc:  NotStarted → PendingReview → Verified   (approves the account)
//!                          │
//!                          └───────→ Rejected   (account back to Pending)
//! ```
//!
//! Admin operations re-verify the caller's role through `AuthPort` on every
//! call; the privileged auth capability is passed explicitly into the two
//! operations that need it.

pub mod error;
pub mod kyc;
pub mod lifecycle;
pub mod partner;
pub mod ports;

pub use error::PartnerError;
pub use kyc::{KycDecision, KycDocument, KycDocumentType, KycStatus};
pub use lifecycle::{PartnerLifecycleManager, RegisterPartnerRequest, SubmitDocument};
pub use partner::{Partner, PartnerStatus, Pricing, STANDARD_COMMISSION_PERCENT};
pub use ports::{PartnerPatch, PartnerStore};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPartnerStore;
