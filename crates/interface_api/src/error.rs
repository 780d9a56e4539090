//! API error handling
//!
//! Domain errors map onto a small set of HTTP shapes. Two cases deserve
//! attention:
//!
//! - A structured business refusal from the trusted intermediary comes back
//!   as 422 with the refusal message verbatim, so the partner sees exactly
//!   what the function computed ("Insufficient balance", not a paraphrase).
//! - An outcome-unknown failure (the call to the intermediary died in
//!   transit) is 502 with code `outcome_unknown`. Clients must reconcile
//!   before retrying; a retry might double-move money.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_banking::BankingError;
use domain_partner::PartnerError;
use domain_payout::PayoutError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Per-field validation failures
    #[error("Validation failed")]
    FieldValidation(Vec<String>),

    /// Business refusal from the trusted intermediary, message verbatim
    #[error("{0}")]
    Rejected(String),

    /// The outbound call died in transit; reconcile before retrying
    #[error("Outcome unknown: {0}")]
    OutcomeUnknown(String),

    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg,
                None,
            ),
            ApiError::FieldValidation(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Validation failed".to_string(),
                Some(details),
            ),
            ApiError::Rejected(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "rejected", msg, None)
            }
            ApiError::OutcomeUnknown(msg) => {
                (StatusCode::BAD_GATEWAY, "outcome_unknown", msg, None)
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg, None),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg,
                None,
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { message, .. } => ApiError::Validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Unauthorized { .. } => ApiError::Unauthorized,
            PortError::Forbidden { message } => ApiError::Forbidden(message),
            PortError::ServiceUnavailable { service } => ApiError::Upstream(service),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PartnerError> for ApiError {
    fn from(err: PartnerError) -> Self {
        match err {
            PartnerError::NotFound(msg) => ApiError::NotFound(msg),
            PartnerError::Duplicate(msg) => ApiError::Conflict(msg),
            PartnerError::InvalidTransition(msg) => ApiError::Conflict(msg),
            PartnerError::Unauthorized(_) => ApiError::Unauthorized,
            PartnerError::Forbidden => ApiError::Forbidden("Admin role required".to_string()),
            PartnerError::InvalidPricing(_) | PartnerError::Validation(_) => {
                ApiError::Validation(err.to_string())
            }
            PartnerError::Store(port) => port.into(),
        }
    }
}

impl From<BankingError> for ApiError {
    fn from(err: BankingError) -> Self {
        match err {
            BankingError::Validation(fields) => ApiError::FieldValidation(
                fields
                    .into_iter()
                    .map(|f| format!("{}: {}", f.field, f.message))
                    .collect(),
            ),
            BankingError::NotFound(msg) => ApiError::NotFound(msg),
            BankingError::NoPartner(_) => {
                ApiError::NotFound("No partner account for this user".to_string())
            }
            BankingError::Unauthorized(_) => ApiError::Unauthorized,
            BankingError::Store(port) => port.into(),
        }
    }
}

impl From<PayoutError> for ApiError {
    fn from(err: PayoutError) -> Self {
        match err {
            PayoutError::InvalidAmount(_) | PayoutError::NoPrimaryBankAccount => {
                ApiError::Validation(err.to_string())
            }
            PayoutError::Unauthorized(_) => ApiError::Unauthorized,
            PayoutError::Forbidden => ApiError::Forbidden("Admin role required".to_string()),
            PayoutError::Rejected(msg) => ApiError::Rejected(msg),
            PayoutError::OutcomeUnknown(msg) => ApiError::OutcomeUnknown(msg),
            PayoutError::InvalidTransition(msg) => ApiError::Conflict(msg),
            PayoutError::NotFound(msg) => ApiError::NotFound(msg),
            PayoutError::Store(port) => port.into(),
        }
    }
}
