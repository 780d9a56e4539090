//! Partner domain ports
//!
//! `PartnerStore` is the persistence port for the partner aggregate and its
//! KYC documents. The production implementation lives in `infra_db`; the
//! in-memory mock here backs unit tests.
//!
//! Every lifecycle transition persists through a single [`PartnerPatch`]
//! update. A patch is applied atomically: either all of its fields land or
//! none do, so a transition can never be half-written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{DomainPort, KycDocumentId, PartnerId, PortError, UserId};

use crate::kyc::{KycDocument, KycStatus};
use crate::partner::{Partner, PartnerStatus, Pricing};

/// A partial update to a partner row
///
/// `None` means "leave unchanged". Nullable columns use a nested Option so a
/// patch can distinguish "unchanged" from "set to NULL" (reactivation clears
/// admin notes, approval clears the rejection reason).
#[derive(Debug, Clone, Default)]
pub struct PartnerPatch {
    pub status: Option<PartnerStatus>,
    pub kyc_status: Option<KycStatus>,
    pub verified: Option<bool>,
    pub pricing: Option<Pricing>,
    pub admin_notes: Option<Option<String>>,
    pub rejection_reason: Option<Option<String>>,
    pub approved_by: Option<Option<UserId>>,
    pub approved_at: Option<Option<DateTime<Utc>>>,
}

impl PartnerPatch {
    /// Derives the patch that brings a stored row up to date with an
    /// already-transitioned aggregate
    pub fn from_partner(partner: &Partner) -> Self {
        Self {
            status: Some(partner.status),
            kyc_status: Some(partner.kyc_status),
            verified: Some(partner.verified),
            pricing: Some(partner.pricing),
            admin_notes: Some(partner.admin_notes.clone()),
            rejection_reason: Some(partner.rejection_reason.clone()),
            approved_by: Some(partner.approved_by),
            approved_at: Some(partner.approved_at),
        }
    }

    /// A patch that only changes the pricing scheme
    pub fn pricing(pricing: Pricing) -> Self {
        Self {
            pricing: Some(pricing),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.kyc_status.is_none()
            && self.verified.is_none()
            && self.pricing.is_none()
            && self.admin_notes.is_none()
            && self.rejection_reason.is_none()
            && self.approved_by.is_none()
            && self.approved_at.is_none()
    }
}

/// Persistence port for partners and their KYC documents
#[async_trait]
pub trait PartnerStore: DomainPort {
    /// Retrieves a partner by ID, or `PortError::NotFound`
    async fn get(&self, id: PartnerId) -> Result<Partner, PortError>;

    /// Finds the partner owned by an auth identity
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Partner>, PortError>;

    /// Inserts a new partner row; `PortError::Conflict` if the user already
    /// has one
    async fn insert(&self, partner: &Partner) -> Result<(), PortError>;

    /// Applies a patch as a single atomic update and returns the new row
    async fn update(&self, id: PartnerId, patch: PartnerPatch) -> Result<Partner, PortError>;

    /// Lists partners in a given status, newest first (admin queues)
    async fn list_by_status(&self, status: PartnerStatus) -> Result<Vec<Partner>, PortError>;

    /// Records a submitted KYC document
    async fn add_document(&self, document: &KycDocument) -> Result<(), PortError>;

    /// Retrieves a KYC document by ID
    async fn get_document(&self, id: KycDocumentId) -> Result<KycDocument, PortError>;

    /// Lists a partner's KYC documents, oldest first
    async fn list_documents(&self, partner_id: PartnerId) -> Result<Vec<KycDocument>, PortError>;

    /// Stamps a document with its reviewing admin
    async fn mark_document_reviewed(
        &self,
        id: KycDocumentId,
        reviewer: UserId,
    ) -> Result<(), PortError>;
}

/// In-memory mock implementation of PartnerStore
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock store backed by in-memory maps
    #[derive(Debug, Default)]
    pub struct MockPartnerStore {
        partners: Arc<RwLock<HashMap<PartnerId, Partner>>>,
        documents: Arc<RwLock<HashMap<KycDocumentId, KycDocument>>>,
    }

    impl MockPartnerStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store with partners
        pub async fn with_partners(partners: Vec<Partner>) -> Self {
            let store = Self::new();
            for partner in partners {
                store.partners.write().await.insert(partner.id, partner);
            }
            store
        }
    }

    impl DomainPort for MockPartnerStore {}

    #[async_trait]
    impl PartnerStore for MockPartnerStore {
        async fn get(&self, id: PartnerId) -> Result<Partner, PortError> {
            self.partners
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Partner", id))
        }

        async fn find_by_user(&self, user_id: UserId) -> Result<Option<Partner>, PortError> {
            Ok(self
                .partners
                .read()
                .await
                .values()
                .find(|p| p.user_id == user_id)
                .cloned())
        }

        async fn insert(&self, partner: &Partner) -> Result<(), PortError> {
            let mut partners = self.partners.write().await;
            if partners.values().any(|p| p.user_id == partner.user_id) {
                return Err(PortError::Conflict {
                    message: format!("partner already exists for user {}", partner.user_id),
                });
            }
            partners.insert(partner.id, partner.clone());
            Ok(())
        }

        async fn update(&self, id: PartnerId, patch: PartnerPatch) -> Result<Partner, PortError> {
            let mut partners = self.partners.write().await;
            let partner = partners
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Partner", id))?;

            if let Some(status) = patch.status {
                partner.status = status;
            }
            if let Some(kyc_status) = patch.kyc_status {
                partner.kyc_status = kyc_status;
            }
            if let Some(verified) = patch.verified {
                partner.verified = verified;
            }
            if let Some(pricing) = patch.pricing {
                partner.pricing = pricing;
            }
            if let Some(admin_notes) = patch.admin_notes {
                partner.admin_notes = admin_notes;
            }
            if let Some(rejection_reason) = patch.rejection_reason {
                partner.rejection_reason = rejection_reason;
            }
            if let Some(approved_by) = patch.approved_by {
                partner.approved_by = approved_by;
            }
            if let Some(approved_at) = patch.approved_at {
                partner.approved_at = approved_at;
            }
            partner.updated_at = Utc::now();

            Ok(partner.clone())
        }

        async fn list_by_status(&self, status: PartnerStatus) -> Result<Vec<Partner>, PortError> {
            let mut results: Vec<Partner> = self
                .partners
                .read()
                .await
                .values()
                .filter(|p| p.status == status)
                .cloned()
                .collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(results)
        }

        async fn add_document(&self, document: &KycDocument) -> Result<(), PortError> {
            self.documents
                .write()
                .await
                .insert(document.id, document.clone());
            Ok(())
        }

        async fn get_document(&self, id: KycDocumentId) -> Result<KycDocument, PortError> {
            self.documents
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("KycDocument", id))
        }

        async fn list_documents(
            &self,
            partner_id: PartnerId,
        ) -> Result<Vec<KycDocument>, PortError> {
            let mut docs: Vec<KycDocument> = self
                .documents
                .read()
                .await
                .values()
                .filter(|d| d.partner_id == partner_id)
                .cloned()
                .collect();
            docs.sort_by_key(|d| d.submitted_at);
            Ok(docs)
        }

        async fn mark_document_reviewed(
            &self,
            id: KycDocumentId,
            reviewer: UserId,
        ) -> Result<(), PortError> {
            let mut documents = self.documents.write().await;
            let document = documents
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("KycDocument", id))?;
            document.mark_reviewed(reviewer);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPartnerStore;
    use super::*;

    #[tokio::test]
    async fn test_mock_store_insert_and_get() {
        let store = MockPartnerStore::new();
        let partner = Partner::new(UserId::new(), "Bali Beats", "crew@balibeats.example");

        store.insert(&partner).await.unwrap();
        let retrieved = store.get(partner.id).await.unwrap();
        assert_eq!(retrieved.business_name, "Bali Beats");
    }

    #[tokio::test]
    async fn test_mock_store_rejects_duplicate_user() {
        let store = MockPartnerStore::new();
        let user = UserId::new();
        store
            .insert(&Partner::new(user, "First", "a@example.com"))
            .await
            .unwrap();

        let result = store
            .insert(&Partner::new(user, "Second", "b@example.com"))
            .await;
        assert!(matches!(result, Err(PortError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_mock_store_patch_clears_nullable_field() {
        let store = MockPartnerStore::new();
        let mut partner = Partner::new(UserId::new(), "Surabaya Sounds", "x@example.com");
        partner.admin_notes = Some("watch this one".to_string());
        store.insert(&partner).await.unwrap();

        let updated = store
            .update(
                partner.id,
                PartnerPatch {
                    admin_notes: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.admin_notes.is_none());
    }

    #[tokio::test]
    async fn test_mock_store_not_found() {
        let store = MockPartnerStore::new();
        let result = store.get(PartnerId::new_v7()).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mock_store_document_listing() {
        use crate::kyc::{KycDocument, KycDocumentType};

        let store = MockPartnerStore::new();
        let partner_id = PartnerId::new();
        let other_id = PartnerId::new();

        let doc = KycDocument::new(partner_id, KycDocumentType::NationalId, "kyc/a/id.jpg");
        store.add_document(&doc).await.unwrap();
        store
            .add_document(&KycDocument::new(
                other_id,
                KycDocumentType::TaxId,
                "kyc/b/npwp.pdf",
            ))
            .await
            .unwrap();

        let docs = store.list_documents(partner_id).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, doc.id);
    }
}
