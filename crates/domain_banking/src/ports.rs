//! Banking domain ports
//!
//! `BankAccountStore` persists disbursement destinations. Its contract is
//! where the single-primary invariant lives: `insert` with a primary account
//! and `set_primary` both swap the flag atomically, so no interleaving of
//! store calls can observe two primary rows for one partner. The PostgreSQL
//! implementation backs this with one conditional UPDATE plus a partial
//! unique index; the mock mirrors the same semantics under one write lock.

use async_trait::async_trait;

use core_kernel::{BankAccountId, DomainPort, PartnerId, PortError};

use crate::bank_account::BankAccount;

/// Persistence port for bank accounts
#[async_trait]
pub trait BankAccountStore: DomainPort {
    /// Inserts an account. If `account.is_primary` is set, any existing
    /// primary for the partner is demoted in the same atomic step.
    async fn insert(&self, account: &BankAccount) -> Result<(), PortError>;

    /// Retrieves an account by ID
    async fn get(&self, id: BankAccountId) -> Result<BankAccount, PortError>;

    /// The partner's current primary account, if any
    async fn find_primary(&self, partner_id: PartnerId) -> Result<Option<BankAccount>, PortError>;

    /// All of a partner's accounts, oldest first
    async fn list_for_partner(
        &self,
        partner_id: PartnerId,
    ) -> Result<Vec<BankAccount>, PortError>;

    /// Makes exactly one of the partner's accounts primary
    ///
    /// Implemented as a single conditional update over the partner's rows
    /// (`is_primary = (id = target)`), never as unmark-then-mark.
    /// `PortError::NotFound` if the target does not belong to the partner.
    async fn set_primary(
        &self,
        partner_id: PartnerId,
        account_id: BankAccountId,
    ) -> Result<BankAccount, PortError>;

    /// Deletes an account by ID
    async fn delete(&self, id: BankAccountId) -> Result<(), PortError>;
}

/// In-memory mock implementation of BankAccountStore
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockBankAccountStore {
        accounts: Arc<RwLock<HashMap<BankAccountId, BankAccount>>>,
    }

    impl MockBankAccountStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Count of primary rows for a partner (invariant checks in tests)
        pub async fn primary_count(&self, partner_id: PartnerId) -> usize {
            self.accounts
                .read()
                .await
                .values()
                .filter(|a| a.partner_id == partner_id && a.is_primary)
                .count()
        }
    }

    impl DomainPort for MockBankAccountStore {}

    #[async_trait]
    impl BankAccountStore for MockBankAccountStore {
        async fn insert(&self, account: &BankAccount) -> Result<(), PortError> {
            let mut accounts = self.accounts.write().await;
            if account.is_primary {
                for existing in accounts.values_mut() {
                    if existing.partner_id == account.partner_id {
                        existing.is_primary = false;
                    }
                }
            }
            accounts.insert(account.id, account.clone());
            Ok(())
        }

        async fn get(&self, id: BankAccountId) -> Result<BankAccount, PortError> {
            self.accounts
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("BankAccount", id))
        }

        async fn find_primary(
            &self,
            partner_id: PartnerId,
        ) -> Result<Option<BankAccount>, PortError> {
            Ok(self
                .accounts
                .read()
                .await
                .values()
                .find(|a| a.partner_id == partner_id && a.is_primary)
                .cloned())
        }

        async fn list_for_partner(
            &self,
            partner_id: PartnerId,
        ) -> Result<Vec<BankAccount>, PortError> {
            let mut results: Vec<BankAccount> = self
                .accounts
                .read()
                .await
                .values()
                .filter(|a| a.partner_id == partner_id)
                .cloned()
                .collect();
            results.sort_by_key(|a| a.created_at);
            Ok(results)
        }

        async fn set_primary(
            &self,
            partner_id: PartnerId,
            account_id: BankAccountId,
        ) -> Result<BankAccount, PortError> {
            let mut accounts = self.accounts.write().await;

            let owned = accounts
                .get(&account_id)
                .map(|a| a.partner_id == partner_id)
                .unwrap_or(false);
            if !owned {
                return Err(PortError::not_found("BankAccount", account_id));
            }

            // One pass under the lock: is_primary = (id == target)
            for account in accounts.values_mut() {
                if account.partner_id == partner_id {
                    account.is_primary = account.id == account_id;
                }
            }

            Ok(accounts.get(&account_id).cloned().unwrap())
        }

        async fn delete(&self, id: BankAccountId) -> Result<(), PortError> {
            self.accounts
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("BankAccount", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockBankAccountStore;
    use super::*;
    use crate::bank_account::BankChannel;

    #[tokio::test]
    async fn test_primary_insert_demotes_previous() {
        let store = MockBankAccountStore::new();
        let partner = PartnerId::new();

        let mut first = BankAccount::new(partner, BankChannel::Bca, "11111", "A");
        first.is_primary = true;
        store.insert(&first).await.unwrap();

        let mut second = BankAccount::new(partner, BankChannel::Bni, "22222", "A");
        second.is_primary = true;
        store.insert(&second).await.unwrap();

        assert_eq!(store.primary_count(partner).await, 1);
        assert_eq!(
            store.find_primary(partner).await.unwrap().unwrap().id,
            second.id
        );
    }

    #[tokio::test]
    async fn test_set_primary_swaps_atomically() {
        let store = MockBankAccountStore::new();
        let partner = PartnerId::new();

        let mut a = BankAccount::new(partner, BankChannel::Bca, "11111", "A");
        a.is_primary = true;
        let b = BankAccount::new(partner, BankChannel::Mandiri, "22222", "A");
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();

        let promoted = store.set_primary(partner, b.id).await.unwrap();
        assert!(promoted.is_primary);
        assert_eq!(store.primary_count(partner).await, 1);
        assert!(!store.get(a.id).await.unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_set_primary_rejects_foreign_account() {
        let store = MockBankAccountStore::new();
        let partner = PartnerId::new();
        let intruder = PartnerId::new();

        let account = BankAccount::new(partner, BankChannel::Bri, "33333", "B");
        store.insert(&account).await.unwrap();

        let result = store.set_primary(intruder, account.id).await;
        assert!(result.unwrap_err().is_not_found());
        // The real owner's row is untouched
        assert!(!store.get(account.id).await.unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_delete_unknown_account() {
        let store = MockBankAccountStore::new();
        assert!(store
            .delete(BankAccountId::new_v7())
            .await
            .unwrap_err()
            .is_not_found());
    }
}
