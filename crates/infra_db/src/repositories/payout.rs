//! PostgreSQL payout store
//!
//! Rows are written by the request path and advanced by webhook patches.
//! Each status change lands as one UPDATE guarded by the payout id, so an
//! admin action and a provider webhook can never interleave into a
//! half-written row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{Currency, DisbursementId, DomainPort, Money, PartnerId, PayoutId, PortError};
use domain_payout::payout::{Payout, PayoutStatus};
use domain_payout::ports::{PayoutPatch, PayoutStore};

use crate::error::DatabaseError;

const PAYOUT_COLUMNS: &str = "id, partner_id, amount, currency, status, rejection_reason, \
     disbursement_id, processed_at, completed_at, created_at, updated_at";

/// PostgreSQL-backed implementation of [`PayoutStore`]
#[derive(Debug, Clone)]
pub struct PgPayoutStore {
    pool: PgPool,
}

impl PgPayoutStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PayoutRow {
    id: Uuid,
    partner_id: Uuid,
    amount: Decimal,
    currency: String,
    status: String,
    rejection_reason: Option<String>,
    disbursement_id: Option<Uuid>,
    processed_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PayoutRow> for Payout {
    type Error = DatabaseError;

    fn try_from(row: PayoutRow) -> Result<Self, Self::Error> {
        let currency: Currency = row
            .currency
            .parse()
            .map_err(|e| DatabaseError::CorruptRow(format!("{e}")))?;
        Ok(Payout {
            id: PayoutId::from(row.id),
            partner_id: PartnerId::from(row.partner_id),
            amount: Money::new(row.amount, currency),
            status: parse_payout_status(&row.status)?,
            rejection_reason: row.rejection_reason,
            disbursement_id: row.disbursement_id.map(DisbursementId::from),
            processed_at: row.processed_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_payout_status(s: &str) -> Result<PayoutStatus, DatabaseError> {
    match s {
        "requested" => Ok(PayoutStatus::Requested),
        "processing" => Ok(PayoutStatus::Processing),
        "completed" => Ok(PayoutStatus::Completed),
        "rejected" => Ok(PayoutStatus::Rejected),
        other => Err(DatabaseError::CorruptRow(format!(
            "unknown payout status {other:?}"
        ))),
    }
}

impl DomainPort for PgPayoutStore {}

#[async_trait]
impl PayoutStore for PgPayoutStore {
    async fn get(&self, id: PayoutId) -> Result<Payout, PortError> {
        let row: Option<PayoutRow> = sqlx::query_as(&format!(
            "SELECT {PAYOUT_COLUMNS} FROM payouts WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let row = row.ok_or_else(|| PortError::not_found("Payout", id))?;
        Ok(Payout::try_from(row)?)
    }

    #[instrument(skip(self, payout), fields(payout_id = %payout.id))]
    async fn insert(&self, payout: &Payout) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO payouts (
                id, partner_id, amount, currency, status, rejection_reason,
                disbursement_id, processed_at, completed_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(*payout.id.as_uuid())
        .bind(*payout.partner_id.as_uuid())
        .bind(payout.amount.amount())
        .bind(payout.amount.currency().code())
        .bind(payout.status.to_string())
        .bind(&payout.rejection_reason)
        .bind(payout.disbursement_id.map(|d| *d.as_uuid()))
        .bind(payout.processed_at)
        .bind(payout.completed_at)
        .bind(payout.created_at)
        .bind(payout.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: PayoutId, patch: PayoutPatch) -> Result<Payout, PortError> {
        let mut qb = QueryBuilder::new("UPDATE payouts SET updated_at = now()");

        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.to_string());
        }
        if let Some(rejection_reason) = patch.rejection_reason {
            qb.push(", rejection_reason = ").push_bind(rejection_reason);
        }
        if let Some(disbursement_id) = patch.disbursement_id {
            qb.push(", disbursement_id = ")
                .push_bind(disbursement_id.map(|d| *d.as_uuid()));
        }
        if let Some(processed_at) = patch.processed_at {
            qb.push(", processed_at = ").push_bind(processed_at);
        }
        if let Some(completed_at) = patch.completed_at {
            qb.push(", completed_at = ").push_bind(completed_at);
        }

        qb.push(" WHERE id = ").push_bind(*id.as_uuid());
        qb.push(" RETURNING ").push(PAYOUT_COLUMNS);

        let row: Option<PayoutRow> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let row = row.ok_or_else(|| PortError::not_found("Payout", id))?;
        Ok(Payout::try_from(row)?)
    }

    async fn list_for_partner(&self, partner_id: PartnerId) -> Result<Vec<Payout>, PortError> {
        let rows: Vec<PayoutRow> = sqlx::query_as(&format!(
            "SELECT {PAYOUT_COLUMNS} FROM payouts \
             WHERE partner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(*partner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| Payout::try_from(row).map_err(Into::into))
            .collect()
    }
}
