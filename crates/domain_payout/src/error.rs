//! Payout domain errors
//!
//! The split that matters here is `Rejected` versus `OutcomeUnknown`.
//! `Rejected` carries a structured refusal from the trusted intermediary or
//! the provider and is surfaced to the caller verbatim. `OutcomeUnknown`
//! means the outbound call died in transit: the money may or may not be
//! moving, so the caller must reconcile through the webhook or a status
//! query, never by retrying blindly.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the payout domain
#[derive(Debug, Error)]
pub enum PayoutError {
    /// Payout amount must be strictly positive
    #[error("Invalid payout amount: {0}")]
    InvalidAmount(Decimal),

    /// No valid session for the caller
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the admin role
    #[error("Admin role required")]
    Forbidden,

    /// The partner has no primary bank account to pay into
    #[error("No primary bank account")]
    NoPrimaryBankAccount,

    /// Structured business refusal, surfaced verbatim
    #[error("{0}")]
    Rejected(String),

    /// The outbound call failed in transit; the outcome is unknown
    #[error("Payout outcome unknown: {0}")]
    OutcomeUnknown(String),

    /// The requested status change is not a legal edge
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Payout not found
    #[error("Payout not found: {0}")]
    NotFound(String),

    /// The underlying store failed
    #[error(transparent)]
    Store(#[from] PortError),
}

impl PayoutError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        PayoutError::NotFound(id.to_string())
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        PayoutError::InvalidTransition(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        PayoutError::Unauthorized(message.into())
    }

    /// True when reconciliation is required before any retry
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, PayoutError::OutcomeUnknown(_))
    }
}
