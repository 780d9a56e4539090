//! Payout handlers
//!
//! Two entry points mutate payout state: the authenticated routes (request,
//! approve, reject) and the provider webhook. The webhook authenticates with
//! a shared token instead of a session and is idempotent under redelivery.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use tracing::{info, warn};

use core_kernel::{Currency, Money, PayoutId, Session};

use crate::dto::partner::ReasonBody;
use crate::dto::payout::*;
use crate::{error::ApiError, AppState};

/// Requests a payout for the caller's partner
pub async fn request_payout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<RequestPayoutBody>,
) -> Result<Json<PayoutResponse>, ApiError> {
    let currency: Currency = body
        .currency
        .as_deref()
        .unwrap_or("IDR")
        .parse()
        .map_err(|_| ApiError::Validation("Unsupported currency".to_string()))?;

    let partner = state.partners.partner_for_session(&session).await?;
    let payout = state
        .payouts
        .request_payout(&session, partner.id, Money::new(body.amount, currency))
        .await?;
    Ok(Json(payout.into()))
}

/// Lists the caller's payouts, newest first
pub async fn list_payouts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<PayoutResponse>>, ApiError> {
    let partner = state.partners.partner_for_session(&session).await?;
    let payouts = state.payouts.payouts_for_partner(&session, partner.id).await?;
    Ok(Json(payouts.into_iter().map(Into::into).collect()))
}

/// Approves a payout, forwarding to the trusted function
pub async fn approve_payout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<PayoutId>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let receipt = state.payouts.approve_payout(&session, id).await?;
    Ok(Json(receipt.into()))
}

/// Rejects a payout with a reason
pub async fn reject_payout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<PayoutId>,
    Json(body): Json<ReasonBody>,
) -> Result<Json<PayoutResponse>, ApiError> {
    let payout = state
        .payouts
        .reject_payout(&session, id, &body.reason)
        .await?;
    Ok(Json(payout.into()))
}

/// Disbursement provider webhook
///
/// Authenticated by a shared token header. Terminal replays are treated as
/// no-ops by the payout state machine, so redelivery is safe.
pub async fn disbursement_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DisbursementWebhookBody>,
) -> Result<StatusCode, ApiError> {
    let token = headers
        .get("X-Webhook-Token")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    if state.config.webhook_token.is_empty() || token != state.config.webhook_token {
        warn!("Webhook call with missing or invalid token");
        return Err(ApiError::Unauthorized);
    }

    match body {
        DisbursementWebhookBody::Issued {
            payout_id,
            disbursement_id,
        } => {
            info!(%payout_id, %disbursement_id, "Disbursement issued");
            state.payouts.mark_processing(payout_id, disbursement_id).await?;
        }
        DisbursementWebhookBody::Completed { payout_id } => {
            info!(%payout_id, "Disbursement completed");
            state.payouts.mark_completed(payout_id).await?;
        }
        DisbursementWebhookBody::Failed { payout_id, reason } => {
            warn!(%payout_id, %reason, "Disbursement failed");
            state.payouts.mark_failed(payout_id, &reason).await?;
        }
    }

    Ok(StatusCode::OK)
}
