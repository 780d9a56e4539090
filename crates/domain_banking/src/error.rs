//! Banking domain errors

use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;

/// A single failed field in a request payload
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors that can occur in the banking domain
#[derive(Debug, Error)]
pub enum BankingError {
    /// Request payload failed validation; carries per-field messages
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Bank account not found
    #[error("Bank account not found: {0}")]
    NotFound(String),

    /// Caller has no partner account
    #[error("No partner account for user {0}")]
    NoPartner(String),

    /// No valid session for the caller
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The underlying store failed
    #[error(transparent)]
    Store(#[from] PortError),
}

impl BankingError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        BankingError::NotFound(id.to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        BankingError::Unauthorized(message.into())
    }
}
