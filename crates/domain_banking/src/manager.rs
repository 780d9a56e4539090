//! Bank Account Manager
//!
//! Partner self-service over disbursement destinations. The partner is
//! always resolved from the authenticated session, never from the request
//! payload, so one partner cannot touch another's accounts through this
//! surface. Row-level policies in the store are the second line of defense.

use std::sync::Arc;

use validator::Validate;

use core_kernel::{AuthPort, BankAccountId, Session};
use domain_partner::{Partner, PartnerStore};

use crate::bank_account::{BankAccount, BankChannel};
use crate::error::{BankingError, FieldError};
use crate::ports::BankAccountStore;

/// Request to register a disbursement destination
#[derive(Debug, Clone, Validate)]
pub struct AddBankAccountRequest {
    pub channel: BankChannel,
    #[validate(length(min = 5, max = 20, message = "Account number must be 5-20 digits"))]
    pub account_number: String,
    #[validate(length(min = 2, max = 100, message = "Holder name must be at least 2 characters"))]
    pub holder_name: String,
    /// Promote this account to primary on insert
    pub make_primary: bool,
}

impl AddBankAccountRequest {
    /// Collects every field failure, derive-checked lengths plus the
    /// digits-only rule
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = Vec::new();

        if let Err(validation) = self.validate() {
            for (field, failures) in validation.field_errors() {
                for failure in failures {
                    let message = failure
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| failure.code.to_string());
                    errors.push(FieldError::new(field, message));
                }
            }
        }

        if !self.account_number.is_empty()
            && !self.account_number.chars().all(|c| c.is_ascii_digit())
        {
            errors.push(FieldError::new(
                "account_number",
                "Account number must contain only digits",
            ));
        }

        errors
    }
}

/// Application service for partner bank accounts
pub struct BankAccountManager {
    accounts: Arc<dyn BankAccountStore>,
    partners: Arc<dyn PartnerStore>,
    auth: Arc<dyn AuthPort>,
}

impl BankAccountManager {
    pub fn new(
        accounts: Arc<dyn BankAccountStore>,
        partners: Arc<dyn PartnerStore>,
        auth: Arc<dyn AuthPort>,
    ) -> Self {
        Self {
            accounts,
            partners,
            auth,
        }
    }

    /// Registers a new disbursement destination for the caller's partner
    ///
    /// Validation failures return every offending field at once and nothing
    /// is written. If `make_primary` is set the store swaps the primary flag
    /// atomically as part of the insert.
    pub async fn add_bank_account(
        &self,
        session: &Session,
        request: AddBankAccountRequest,
    ) -> Result<BankAccount, BankingError> {
        self.require_session(session).await?;

        let errors = request.field_errors();
        if !errors.is_empty() {
            return Err(BankingError::Validation(errors));
        }

        let partner = self.caller_partner(session).await?;

        let mut account = BankAccount::new(
            partner.id,
            request.channel,
            request.account_number,
            request.holder_name,
        );
        account.is_primary = request.make_primary;

        self.accounts.insert(&account).await?;
        Ok(account)
    }

    /// Promotes one of the caller's accounts to primary
    pub async fn set_primary_bank_account(
        &self,
        session: &Session,
        account_id: BankAccountId,
    ) -> Result<BankAccount, BankingError> {
        self.require_session(session).await?;
        let partner = self.caller_partner(session).await?;

        self.accounts
            .set_primary(partner.id, account_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    BankingError::not_found(account_id)
                } else {
                    BankingError::Store(e)
                }
            })
    }

    /// Deletes an account by ID
    ///
    /// The delete is keyed on the account ID alone; the store's row-level
    /// policy keeps a partner from reaching another partner's rows.
    pub async fn delete_bank_account(
        &self,
        session: &Session,
        account_id: BankAccountId,
    ) -> Result<(), BankingError> {
        self.require_session(session).await?;
        self.accounts.delete(account_id).await.map_err(|e| {
            if e.is_not_found() {
                BankingError::not_found(account_id)
            } else {
                BankingError::Store(e)
            }
        })
    }

    /// The caller's accounts, oldest first
    pub async fn list_bank_accounts(
        &self,
        session: &Session,
    ) -> Result<Vec<BankAccount>, BankingError> {
        self.require_session(session).await?;
        let partner = self.caller_partner(session).await?;
        Ok(self.accounts.list_for_partner(partner.id).await?)
    }

    async fn caller_partner(&self, session: &Session) -> Result<Partner, BankingError> {
        self.partners
            .find_by_user(session.user_id)
            .await?
            .ok_or_else(|| BankingError::NoPartner(session.user_id.to_string()))
    }

    async fn require_session(&self, session: &Session) -> Result<(), BankingError> {
        if session.is_expired() {
            return Err(BankingError::unauthorized("session expired"));
        }
        if !self.auth.verify_session(session).await? {
            return Err(BankingError::unauthorized("invalid session"));
        }
        Ok(())
    }
}
