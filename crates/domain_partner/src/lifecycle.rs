//! Partner Lifecycle Manager
//!
//! Orchestrates partner registration, account review, KYC, and pricing on
//! top of the `PartnerStore` and `AuthPort` ports. Every admin operation
//! re-verifies the caller's role through `AuthPort::is_admin` before
//! touching the store; a role claim carried by the request is never trusted.
//!
//! Registration and document-URL signing additionally take the
//! [`PrivilegedAuth`] capability as an explicit argument. The capability is
//! not stored on the manager so ordinary operations cannot reach it.

use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use validator::Validate;

use core_kernel::{
    AuthPort, KycDocumentId, PartnerId, PrivilegedAuth, Session, SignedUrl, UserId,
};

use crate::error::PartnerError;
use crate::kyc::{KycDecision, KycDocument, KycDocumentType};
use crate::partner::{Partner, PartnerStatus, Pricing};
use crate::ports::{PartnerPatch, PartnerStore};

/// How long a signed KYC document URL stays valid
const DOCUMENT_URL_TTL_MINUTES: i64 = 10;

/// Request to register a new partner
#[derive(Debug, Clone, Validate)]
pub struct RegisterPartnerRequest {
    #[validate(length(min = 2, max = 120, message = "Business name must be 2-120 characters"))]
    pub business_name: String,
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: String,
    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub contact_phone: Option<String>,
}

/// A document being submitted for KYC review
#[derive(Debug, Clone)]
pub struct SubmitDocument {
    pub document_type: KycDocumentType,
    pub storage_path: String,
}

/// Application service for the partner lifecycle
pub struct PartnerLifecycleManager {
    store: Arc<dyn PartnerStore>,
    auth: Arc<dyn AuthPort>,
}

impl PartnerLifecycleManager {
    pub fn new(store: Arc<dyn PartnerStore>, auth: Arc<dyn AuthPort>) -> Self {
        Self { store, auth }
    }

    /// Registers a new partner
    ///
    /// Creates the auth identity through the privileged capability (so the
    /// normal signup side effects are bypassed) and inserts a Pending
    /// partner row with KYC not started.
    pub async fn register_partner(
        &self,
        privileged: &dyn PrivilegedAuth,
        request: RegisterPartnerRequest,
    ) -> Result<Partner, PartnerError> {
        request
            .validate()
            .map_err(|e| PartnerError::Validation(e.to_string()))?;

        let identity = privileged.create_identity(&request.contact_email).await?;

        let mut partner = Partner::new(identity.id, request.business_name, request.contact_email);
        partner.contact_phone = request.contact_phone;

        self.store.insert(&partner).await.map_err(|e| {
            if matches!(e, core_kernel::PortError::Conflict { .. }) {
                PartnerError::Duplicate(identity.id.to_string())
            } else {
                PartnerError::Store(e)
            }
        })?;

        Ok(partner)
    }

    /// Resolves the partner account owned by the session's caller
    pub async fn partner_for_session(&self, session: &Session) -> Result<Partner, PartnerError> {
        self.require_session(session).await?;
        self.store
            .find_by_user(session.user_id)
            .await?
            .ok_or_else(|| PartnerError::not_found(session.user_id))
    }

    /// Admin: Pending → Approved
    pub async fn approve_partner(
        &self,
        session: &Session,
        partner_id: PartnerId,
    ) -> Result<Partner, PartnerError> {
        self.require_admin(session).await?;
        let mut partner = self.store.get(partner_id).await?;
        partner.approve(session.user_id)?;
        self.persist(&partner).await
    }

    /// Admin: Pending → Rejected with a reason
    pub async fn reject_partner(
        &self,
        session: &Session,
        partner_id: PartnerId,
        reason: &str,
    ) -> Result<Partner, PartnerError> {
        self.require_admin(session).await?;
        let mut partner = self.store.get(partner_id).await?;
        partner.reject(reason)?;
        self.persist(&partner).await
    }

    /// Admin: Approved → Suspended with a reason
    pub async fn suspend_partner(
        &self,
        session: &Session,
        partner_id: PartnerId,
        reason: &str,
    ) -> Result<Partner, PartnerError> {
        self.require_admin(session).await?;
        let mut partner = self.store.get(partner_id).await?;
        partner.suspend(reason)?;
        self.persist(&partner).await
    }

    /// Admin: Suspended → Approved, clearing the suspension note
    pub async fn reactivate_partner(
        &self,
        session: &Session,
        partner_id: PartnerId,
    ) -> Result<Partner, PartnerError> {
        self.require_admin(session).await?;
        let mut partner = self.store.get(partner_id).await?;
        partner.reactivate()?;
        self.persist(&partner).await
    }

    /// Partner self-service: submit identity documents for review
    ///
    /// Moves KYC from NotStarted to PendingReview and records the documents.
    pub async fn submit_kyc_documents(
        &self,
        session: &Session,
        documents: Vec<SubmitDocument>,
    ) -> Result<Partner, PartnerError> {
        if documents.is_empty() {
            return Err(PartnerError::Validation(
                "At least one document is required".to_string(),
            ));
        }

        let mut partner = self.partner_for_session(session).await?;
        partner.submit_kyc()?;

        for doc in documents {
            let record = KycDocument::new(partner.id, doc.document_type, doc.storage_path);
            self.store.add_document(&record).await?;
        }

        self.persist(&partner).await
    }

    /// Admin: decide a pending KYC review
    ///
    /// Approval verifies the partner and approves the account in one step,
    /// recording the approver. Rejection requires a reason and sends the
    /// account back to Pending. Either way the partner's unreviewed
    /// documents are stamped with the reviewing admin.
    pub async fn review_kyc(
        &self,
        session: &Session,
        partner_id: PartnerId,
        decision: KycDecision,
        reason: Option<String>,
    ) -> Result<Partner, PartnerError> {
        self.require_admin(session).await?;
        let mut partner = self.store.get(partner_id).await?;

        match decision {
            KycDecision::Approve => partner.verify_kyc(session.user_id)?,
            KycDecision::Reject => {
                let reason = reason.ok_or_else(|| {
                    PartnerError::Validation("A rejection reason is required".to_string())
                })?;
                partner.reject_kyc(reason)?;
            }
        }

        for doc in self.store.list_documents(partner_id).await? {
            if doc.reviewed_at.is_none() {
                self.store
                    .mark_document_reviewed(doc.id, session.user_id)
                    .await?;
            }
        }

        self.persist(&partner).await
    }

    /// Admin: switch a partner to a custom commission percentage
    pub async fn set_custom_pricing(
        &self,
        session: &Session,
        partner_id: PartnerId,
        percent: Decimal,
    ) -> Result<Partner, PartnerError> {
        self.require_admin(session).await?;
        let pricing = Pricing::custom(percent)?;
        // Existence check before the patch so NotFound wins over a silent write
        self.store.get(partner_id).await?;
        Ok(self
            .store
            .update(partner_id, PartnerPatch::pricing(pricing))
            .await?)
    }

    /// Admin: return a partner to standard pricing (idempotent)
    pub async fn reset_to_standard_pricing(
        &self,
        session: &Session,
        partner_id: PartnerId,
    ) -> Result<Partner, PartnerError> {
        self.require_admin(session).await?;
        let partner = self.store.get(partner_id).await?;
        if partner.pricing.is_standard() {
            return Ok(partner);
        }
        Ok(self
            .store
            .update(partner_id, PartnerPatch::pricing(Pricing::Standard))
            .await?)
    }

    /// Admin: issue a short-lived signed URL for a KYC document
    ///
    /// Documents live in private storage; this is the only way they are
    /// viewed. The privileged capability does the signing.
    pub async fn signed_kyc_document_url(
        &self,
        session: &Session,
        privileged: &dyn PrivilegedAuth,
        document_id: KycDocumentId,
    ) -> Result<SignedUrl, PartnerError> {
        self.require_admin(session).await?;
        let document = self.store.get_document(document_id).await?;
        Ok(privileged
            .sign_document_url(
                &document.storage_path,
                Duration::minutes(DOCUMENT_URL_TTL_MINUTES),
            )
            .await?)
    }

    /// Admin: partners awaiting review, newest first
    pub async fn partners_in_status(
        &self,
        session: &Session,
        status: PartnerStatus,
    ) -> Result<Vec<Partner>, PartnerError> {
        self.require_admin(session).await?;
        Ok(self.store.list_by_status(status).await?)
    }

    /// A partner's own KYC documents
    pub async fn kyc_documents(&self, session: &Session) -> Result<Vec<KycDocument>, PartnerError> {
        let partner = self.partner_for_session(session).await?;
        Ok(self.store.list_documents(partner.id).await?)
    }

    async fn persist(&self, partner: &Partner) -> Result<Partner, PartnerError> {
        Ok(self
            .store
            .update(partner.id, PartnerPatch::from_partner(partner))
            .await?)
    }

    async fn require_session(&self, session: &Session) -> Result<(), PartnerError> {
        if session.is_expired() {
            return Err(PartnerError::unauthorized("session expired"));
        }
        if !self.auth.verify_session(session).await? {
            return Err(PartnerError::unauthorized("invalid session"));
        }
        Ok(())
    }

    /// The role flag is re-read from the identity store on every call
    async fn require_admin(&self, session: &Session) -> Result<(), PartnerError> {
        self.require_session(session).await?;
        if !self.auth.is_admin(session.user_id).await? {
            return Err(PartnerError::Forbidden);
        }
        Ok(())
    }
}
