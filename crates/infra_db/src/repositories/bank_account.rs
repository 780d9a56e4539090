//! PostgreSQL bank account store
//!
//! The single-primary invariant is enforced here, not in the manager. Both
//! promotion paths run as one conditional UPDATE over the partner's rows
//! (`is_primary = (id = target)`), and a partial unique index on
//! `(partner_id) WHERE is_primary` backstops the swap. There is no window
//! where a partner has zero or two primary rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{BankAccountId, DomainPort, PartnerId, PortError};
use domain_banking::bank_account::{BankAccount, BankChannel};
use domain_banking::ports::BankAccountStore;

use crate::error::DatabaseError;

const ACCOUNT_COLUMNS: &str =
    "id, partner_id, channel, account_number, holder_name, is_primary, created_at";

/// PostgreSQL-backed implementation of [`BankAccountStore`]
#[derive(Debug, Clone)]
pub struct PgBankAccountStore {
    pool: PgPool,
}

impl PgBankAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BankAccountRow {
    id: Uuid,
    partner_id: Uuid,
    channel: String,
    account_number: String,
    holder_name: String,
    is_primary: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<BankAccountRow> for BankAccount {
    type Error = DatabaseError;

    fn try_from(row: BankAccountRow) -> Result<Self, Self::Error> {
        let channel: BankChannel = row
            .channel
            .parse()
            .map_err(|e: String| DatabaseError::CorruptRow(e))?;
        Ok(BankAccount {
            id: BankAccountId::from(row.id),
            partner_id: PartnerId::from(row.partner_id),
            channel,
            account_number: row.account_number,
            holder_name: row.holder_name,
            is_primary: row.is_primary,
            created_at: row.created_at,
        })
    }
}

impl DomainPort for PgBankAccountStore {}

#[async_trait]
impl BankAccountStore for PgBankAccountStore {
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn insert(&self, account: &BankAccount) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        if account.is_primary {
            sqlx::query(
                "UPDATE bank_accounts SET is_primary = FALSE \
                 WHERE partner_id = $1 AND is_primary",
            )
            .bind(*account.partner_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;
        }

        sqlx::query(
            "INSERT INTO bank_accounts (
                id, partner_id, channel, account_number, holder_name, is_primary, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*account.id.as_uuid())
        .bind(*account.partner_id.as_uuid())
        .bind(account.channel.code())
        .bind(&account.account_number)
        .bind(&account.holder_name)
        .bind(account.is_primary)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn get(&self, id: BankAccountId) -> Result<BankAccount, PortError> {
        let row: Option<BankAccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM bank_accounts WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let row = row.ok_or_else(|| PortError::not_found("BankAccount", id))?;
        Ok(BankAccount::try_from(row)?)
    }

    async fn find_primary(
        &self,
        partner_id: PartnerId,
    ) -> Result<Option<BankAccount>, PortError> {
        let row: Option<BankAccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM bank_accounts \
             WHERE partner_id = $1 AND is_primary"
        ))
        .bind(*partner_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(BankAccount::try_from)
            .transpose()
            .map_err(Into::into)
    }

    async fn list_for_partner(
        &self,
        partner_id: PartnerId,
    ) -> Result<Vec<BankAccount>, PortError> {
        let rows: Vec<BankAccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM bank_accounts \
             WHERE partner_id = $1 ORDER BY created_at ASC"
        ))
        .bind(*partner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| BankAccount::try_from(row).map_err(Into::into))
            .collect()
    }

    #[instrument(skip(self))]
    async fn set_primary(
        &self,
        partner_id: PartnerId,
        account_id: BankAccountId,
    ) -> Result<BankAccount, PortError> {
        // One conditional swap over the partner's rows. The WHERE scopes the
        // write to the owning partner, so a foreign account id touches
        // nothing and falls out as NotFound below.
        let row: Option<BankAccountRow> = sqlx::query_as(&format!(
            "UPDATE bank_accounts SET is_primary = (id = $2) \
             WHERE partner_id = $1 \
               AND EXISTS (
                   SELECT 1 FROM bank_accounts
                   WHERE id = $2 AND partner_id = $1
               ) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(*partner_id.as_uuid())
        .bind(*account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .into_iter()
        .find(|r: &BankAccountRow| r.id == *account_id.as_uuid());

        let row = row.ok_or_else(|| PortError::not_found("BankAccount", account_id))?;
        Ok(BankAccount::try_from(row)?)
    }

    async fn delete(&self, id: BankAccountId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("BankAccount", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_code_roundtrips() {
        for channel in [
            BankChannel::Bca,
            BankChannel::Bni,
            BankChannel::Bri,
            BankChannel::Mandiri,
            BankChannel::Permata,
            BankChannel::CimbNiaga,
        ] {
            let parsed: BankChannel = channel.code().parse().unwrap();
            assert_eq!(parsed, channel);
        }
    }

    #[test]
    fn test_corrupt_channel_is_reported() {
        let row = BankAccountRow {
            id: Uuid::new_v4(),
            partner_id: Uuid::new_v4(),
            channel: "DANAMON".to_string(),
            account_number: "1234567890".to_string(),
            holder_name: "Dewi".to_string(),
            is_primary: false,
            created_at: Utc::now(),
        };
        assert!(matches!(
            BankAccount::try_from(row),
            Err(DatabaseError::CorruptRow(_))
        ));
    }
}
