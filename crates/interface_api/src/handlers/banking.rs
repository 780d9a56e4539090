//! Bank account handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::{BankAccountId, Session};

use crate::dto::banking::*;
use crate::{error::ApiError, AppState};

/// Registers a disbursement destination for the caller's partner
pub async fn add_bank_account(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<AddBankAccountBody>,
) -> Result<Json<BankAccountResponse>, ApiError> {
    let account = state.banking.add_bank_account(&session, body.into()).await?;
    Ok(Json(account.into()))
}

/// Lists the caller's bank accounts
pub async fn list_bank_accounts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<BankAccountResponse>>, ApiError> {
    let accounts = state.banking.list_bank_accounts(&session).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Makes one account the payout destination
pub async fn set_primary_bank_account(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<BankAccountId>,
) -> Result<Json<BankAccountResponse>, ApiError> {
    let account = state
        .banking
        .set_primary_bank_account(&session, id)
        .await?;
    Ok(Json(account.into()))
}

/// Deletes a bank account
pub async fn delete_bank_account(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<BankAccountId>,
) -> Result<StatusCode, ApiError> {
    state.banking.delete_bank_account(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
