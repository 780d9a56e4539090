//! Partner handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use core_kernel::{KycDocumentId, PartnerId, Session, SignedUrl};
use domain_partner::lifecycle::{RegisterPartnerRequest, SubmitDocument};

use crate::dto::partner::*;
use crate::{error::ApiError, AppState};

/// Registers a new partner
///
/// Public endpoint. The auth identity is bootstrapped through the
/// privileged capability, so the partner can sign in afterwards without
/// going through the normal signup flow.
pub async fn register_partner(
    State(state): State<AppState>,
    Json(body): Json<RegisterPartnerBody>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = state
        .partners
        .register_partner(
            state.privileged.as_ref(),
            RegisterPartnerRequest {
                business_name: body.business_name,
                contact_email: body.contact_email,
                contact_phone: body.contact_phone,
            },
        )
        .await?;
    Ok(Json(partner.into()))
}

/// Returns the caller's partner profile
pub async fn get_my_partner(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = state.partners.partner_for_session(&session).await?;
    Ok(Json(partner.into()))
}

/// Submits KYC documents for the caller's partner
pub async fn submit_kyc(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<SubmitKycBody>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let documents = body
        .documents
        .into_iter()
        .map(|d| SubmitDocument {
            document_type: d.document_type,
            storage_path: d.storage_path,
        })
        .collect();

    let partner = state
        .partners
        .submit_kyc_documents(&session, documents)
        .await?;
    Ok(Json(partner.into()))
}

/// Lists the caller's submitted KYC documents
pub async fn list_my_kyc_documents(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<KycDocumentResponse>>, ApiError> {
    let documents = state.partners.kyc_documents(&session).await?;
    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

/// Lists partners in a given status (admin review queues)
pub async fn list_partners(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PartnerListQuery>,
) -> Result<Json<Vec<PartnerResponse>>, ApiError> {
    let partners = state
        .partners
        .partners_in_status(&session, query.status)
        .await?;
    Ok(Json(partners.into_iter().map(Into::into).collect()))
}

/// Approves a pending partner
pub async fn approve_partner(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<PartnerId>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = state.partners.approve_partner(&session, id).await?;
    Ok(Json(partner.into()))
}

/// Rejects a pending partner with a reason
pub async fn reject_partner(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<PartnerId>,
    Json(body): Json<ReasonBody>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = state
        .partners
        .reject_partner(&session, id, &body.reason)
        .await?;
    Ok(Json(partner.into()))
}

/// Suspends an approved partner
pub async fn suspend_partner(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<PartnerId>,
    Json(body): Json<ReasonBody>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = state
        .partners
        .suspend_partner(&session, id, &body.reason)
        .await?;
    Ok(Json(partner.into()))
}

/// Reactivates a suspended partner
pub async fn reactivate_partner(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<PartnerId>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = state.partners.reactivate_partner(&session, id).await?;
    Ok(Json(partner.into()))
}

/// Records a KYC review verdict
pub async fn review_kyc(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<PartnerId>,
    Json(body): Json<KycReviewBody>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = state
        .partners
        .review_kyc(&session, id, body.decision, body.reason)
        .await?;
    Ok(Json(partner.into()))
}

/// Sets a partner's commission scheme
pub async fn set_pricing(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<PartnerId>,
    Json(body): Json<PricingBody>,
) -> Result<Json<PartnerResponse>, ApiError> {
    let partner = match body {
        PricingBody::Standard => state.partners.reset_to_standard_pricing(&session, id).await?,
        PricingBody::Custom { percent } => {
            state.partners.set_custom_pricing(&session, id, percent).await?
        }
    };
    Ok(Json(partner.into()))
}

/// Returns a short-lived signed URL for a KYC document (admin review)
pub async fn signed_kyc_document_url(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<KycDocumentId>,
) -> Result<Json<SignedUrl>, ApiError> {
    let url = state
        .partners
        .signed_kyc_document_url(&session, state.privileged.as_ref(), id)
        .await?;
    Ok(Json(url))
}
