//! Partner domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the partner domain
#[derive(Debug, Error)]
pub enum PartnerError {
    /// Partner with the given ID was not found
    #[error("Partner not found: {0}")]
    NotFound(String),

    /// A partner account already exists for this user
    #[error("Duplicate partner for user {0}")]
    Duplicate(String),

    /// The requested status change is not a legal edge
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// No valid session for the caller
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the admin role
    #[error("Admin role required")]
    Forbidden,

    /// Commission percentage outside 0-100
    #[error("Invalid commission percentage: {0}")]
    InvalidPricing(Decimal),

    /// Request payload failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The underlying store failed
    #[error(transparent)]
    Store(#[from] PortError),
}

impl PartnerError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        PartnerError::NotFound(id.to_string())
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        PartnerError::InvalidTransition(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        PartnerError::Unauthorized(message.into())
    }
}
