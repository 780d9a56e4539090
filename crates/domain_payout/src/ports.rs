//! Payout domain ports

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{DisbursementId, DomainPort, PartnerId, PayoutId, PortError};

use crate::payout::{Payout, PayoutStatus};

/// A partial update to a payout row
///
/// Status changes are persisted as single patches guarded by the payout id,
/// so a webhook and an admin action can never interleave into a half-written
/// row.
#[derive(Debug, Clone, Default)]
pub struct PayoutPatch {
    pub status: Option<PayoutStatus>,
    pub rejection_reason: Option<Option<String>>,
    pub disbursement_id: Option<Option<DisbursementId>>,
    pub processed_at: Option<Option<DateTime<Utc>>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl PayoutPatch {
    /// Derives the patch that brings a stored row up to date with an
    /// already-transitioned entity
    pub fn from_payout(payout: &Payout) -> Self {
        Self {
            status: Some(payout.status),
            rejection_reason: Some(payout.rejection_reason.clone()),
            disbursement_id: Some(payout.disbursement_id),
            processed_at: Some(payout.processed_at),
            completed_at: Some(payout.completed_at),
        }
    }
}

/// Persistence port for payouts
#[async_trait]
pub trait PayoutStore: DomainPort {
    /// Retrieves a payout by ID, or `PortError::NotFound`
    async fn get(&self, id: PayoutId) -> Result<Payout, PortError>;

    /// Inserts a payout row; `PortError::Conflict` if the id already exists
    async fn insert(&self, payout: &Payout) -> Result<(), PortError>;

    /// Applies a patch as a single atomic update and returns the new row
    async fn update(&self, id: PayoutId, patch: PayoutPatch) -> Result<Payout, PortError>;

    /// A partner's payouts, newest first
    async fn list_for_partner(&self, partner_id: PartnerId) -> Result<Vec<Payout>, PortError>;
}

/// In-memory mock implementation of PayoutStore
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockPayoutStore {
        payouts: Arc<RwLock<HashMap<PayoutId, Payout>>>,
    }

    impl MockPayoutStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_payouts(payouts: Vec<Payout>) -> Self {
            let store = Self::new();
            for payout in payouts {
                store.payouts.write().await.insert(payout.id, payout);
            }
            store
        }

        pub async fn count(&self) -> usize {
            self.payouts.read().await.len()
        }
    }

    impl DomainPort for MockPayoutStore {}

    #[async_trait]
    impl PayoutStore for MockPayoutStore {
        async fn get(&self, id: PayoutId) -> Result<Payout, PortError> {
            self.payouts
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Payout", id))
        }

        async fn insert(&self, payout: &Payout) -> Result<(), PortError> {
            let mut payouts = self.payouts.write().await;
            if payouts.contains_key(&payout.id) {
                return Err(PortError::Conflict {
                    message: format!("payout {} already exists", payout.id),
                });
            }
            payouts.insert(payout.id, payout.clone());
            Ok(())
        }

        async fn update(&self, id: PayoutId, patch: PayoutPatch) -> Result<Payout, PortError> {
            let mut payouts = self.payouts.write().await;
            let payout = payouts
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Payout", id))?;

            if let Some(status) = patch.status {
                payout.status = status;
            }
            if let Some(rejection_reason) = patch.rejection_reason {
                payout.rejection_reason = rejection_reason;
            }
            if let Some(disbursement_id) = patch.disbursement_id {
                payout.disbursement_id = disbursement_id;
            }
            if let Some(processed_at) = patch.processed_at {
                payout.processed_at = processed_at;
            }
            if let Some(completed_at) = patch.completed_at {
                payout.completed_at = completed_at;
            }
            payout.updated_at = Utc::now();

            Ok(payout.clone())
        }

        async fn list_for_partner(
            &self,
            partner_id: PartnerId,
        ) -> Result<Vec<Payout>, PortError> {
            let mut results: Vec<Payout> = self
                .payouts
                .read()
                .await
                .values()
                .filter(|p| p.partner_id == partner_id)
                .cloned()
                .collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(results)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPayoutStore;
    use super::*;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    fn payout() -> Payout {
        Payout::new(PartnerId::new(), Money::new(dec!(250000), Currency::IDR)).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MockPayoutStore::new();
        let p = payout();
        store.insert(&p).await.unwrap();
        assert_eq!(store.get(p.id).await.unwrap().amount, p.amount);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = MockPayoutStore::new();
        let p = payout();
        store.insert(&p).await.unwrap();
        assert!(matches!(
            store.insert(&p).await,
            Err(PortError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_patch_roundtrip() {
        let store = MockPayoutStore::new();
        let mut p = payout();
        store.insert(&p).await.unwrap();

        let disbursement = DisbursementId::new();
        p.mark_processing(disbursement).unwrap();
        let updated = store.update(p.id, PayoutPatch::from_payout(&p)).await.unwrap();

        assert_eq!(updated.status, PayoutStatus::Processing);
        assert_eq!(updated.disbursement_id, Some(disbursement));
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = MockPayoutStore::new();
        let partner = PartnerId::new();

        let older = Payout::new(partner, Money::new(dec!(100000), Currency::IDR)).unwrap();
        store.insert(&older).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let newer = Payout::new(partner, Money::new(dec!(200000), Currency::IDR)).unwrap();
        store.insert(&newer).await.unwrap();

        let listed = store.list_for_partner(partner).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
    }
}
