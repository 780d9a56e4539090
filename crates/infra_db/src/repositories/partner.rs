//! PostgreSQL partner store
//!
//! Backs `domain_partner::PartnerStore`. Lifecycle transitions arrive as a
//! [`PartnerPatch`] and are applied as one UPDATE, so a transition is never
//! half-written. The `user_id` column carries a unique constraint; a second
//! registration for the same identity surfaces as `PortError::Conflict`
//! through the 23505 mapping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{DomainPort, KycDocumentId, PartnerId, PortError, UserId};
use domain_partner::kyc::{KycDocument, KycDocumentType, KycStatus};
use domain_partner::partner::{Partner, PartnerStatus, Pricing};
use domain_partner::ports::{PartnerPatch, PartnerStore};

use crate::error::DatabaseError;

const PARTNER_COLUMNS: &str = "id, user_id, business_name, contact_email, contact_phone, \
     status, kyc_status, verified, pricing_scheme, commission_percent, \
     absorbs_gateway_fees, admin_notes, rejection_reason, approved_by, approved_at, \
     created_at, updated_at";

const DOCUMENT_COLUMNS: &str =
    "id, partner_id, document_type, storage_path, submitted_at, reviewed_at, reviewed_by";

/// PostgreSQL-backed implementation of [`PartnerStore`]
#[derive(Debug, Clone)]
pub struct PgPartnerStore {
    pool: PgPool,
}

impl PgPartnerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PartnerRow {
    id: Uuid,
    user_id: Uuid,
    business_name: String,
    contact_email: String,
    contact_phone: Option<String>,
    status: String,
    kyc_status: String,
    verified: bool,
    pricing_scheme: String,
    commission_percent: Option<Decimal>,
    absorbs_gateway_fees: bool,
    admin_notes: Option<String>,
    rejection_reason: Option<String>,
    approved_by: Option<Uuid>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PartnerRow> for Partner {
    type Error = DatabaseError;

    fn try_from(row: PartnerRow) -> Result<Self, Self::Error> {
        Ok(Partner {
            id: PartnerId::from(row.id),
            user_id: UserId::from(row.user_id),
            business_name: row.business_name,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            status: parse_partner_status(&row.status)?,
            kyc_status: parse_kyc_status(&row.kyc_status)?,
            verified: row.verified,
            pricing: pricing_from_columns(&row.pricing_scheme, row.commission_percent)?,
            absorbs_gateway_fees: row.absorbs_gateway_fees,
            admin_notes: row.admin_notes,
            rejection_reason: row.rejection_reason,
            approved_by: row.approved_by.map(UserId::from),
            approved_at: row.approved_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct KycDocumentRow {
    id: Uuid,
    partner_id: Uuid,
    document_type: String,
    storage_path: String,
    submitted_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
    reviewed_by: Option<Uuid>,
}

impl From<KycDocumentRow> for KycDocument {
    fn from(row: KycDocumentRow) -> Self {
        KycDocument {
            id: KycDocumentId::from(row.id),
            partner_id: PartnerId::from(row.partner_id),
            document_type: decode_document_type(&row.document_type),
            storage_path: row.storage_path,
            submitted_at: row.submitted_at,
            reviewed_at: row.reviewed_at,
            reviewed_by: row.reviewed_by.map(UserId::from),
        }
    }
}

fn parse_partner_status(s: &str) -> Result<PartnerStatus, DatabaseError> {
    match s {
        "pending" => Ok(PartnerStatus::Pending),
        "approved" => Ok(PartnerStatus::Approved),
        "rejected" => Ok(PartnerStatus::Rejected),
        "suspended" => Ok(PartnerStatus::Suspended),
        other => Err(DatabaseError::CorruptRow(format!(
            "unknown partner status {other:?}"
        ))),
    }
}

fn parse_kyc_status(s: &str) -> Result<KycStatus, DatabaseError> {
    match s {
        "not_started" => Ok(KycStatus::NotStarted),
        "pending_review" => Ok(KycStatus::PendingReview),
        "verified" => Ok(KycStatus::Verified),
        "rejected" => Ok(KycStatus::Rejected),
        other => Err(DatabaseError::CorruptRow(format!(
            "unknown kyc status {other:?}"
        ))),
    }
}

fn pricing_from_columns(
    scheme: &str,
    percent: Option<Decimal>,
) -> Result<Pricing, DatabaseError> {
    match (scheme, percent) {
        ("standard", _) => Ok(Pricing::Standard),
        ("custom", Some(percent)) => Ok(Pricing::Custom { percent }),
        ("custom", None) => Err(DatabaseError::CorruptRow(
            "custom pricing row without a commission percent".to_string(),
        )),
        (other, _) => Err(DatabaseError::CorruptRow(format!(
            "unknown pricing scheme {other:?}"
        ))),
    }
}

fn pricing_columns(pricing: Pricing) -> (&'static str, Option<Decimal>) {
    match pricing {
        Pricing::Standard => ("standard", None),
        Pricing::Custom { percent } => ("custom", Some(percent)),
    }
}

fn encode_document_type(document_type: &KycDocumentType) -> String {
    match document_type {
        KycDocumentType::NationalId => "national_id".to_string(),
        KycDocumentType::TaxId => "tax_id".to_string(),
        KycDocumentType::BusinessLicense => "business_license".to_string(),
        KycDocumentType::BankStatement => "bank_statement".to_string(),
        KycDocumentType::Other(name) => name.clone(),
    }
}

fn decode_document_type(s: &str) -> KycDocumentType {
    match s {
        "national_id" => KycDocumentType::NationalId,
        "tax_id" => KycDocumentType::TaxId,
        "business_license" => KycDocumentType::BusinessLicense,
        "bank_statement" => KycDocumentType::BankStatement,
        other => KycDocumentType::Other(other.to_string()),
    }
}

impl DomainPort for PgPartnerStore {}

#[async_trait]
impl PartnerStore for PgPartnerStore {
    #[instrument(skip(self))]
    async fn get(&self, id: PartnerId) -> Result<Partner, PortError> {
        let row: Option<PartnerRow> = sqlx::query_as(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let row = row.ok_or_else(|| PortError::not_found("Partner", id))?;
        Ok(Partner::try_from(row)?)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Partner>, PortError> {
        let row: Option<PartnerRow> = sqlx::query_as(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE user_id = $1"
        ))
        .bind(*user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(Partner::try_from).transpose().map_err(Into::into)
    }

    #[instrument(skip(self, partner), fields(partner_id = %partner.id))]
    async fn insert(&self, partner: &Partner) -> Result<(), PortError> {
        let (scheme, percent) = pricing_columns(partner.pricing);

        sqlx::query(
            "INSERT INTO partners (
                id, user_id, business_name, contact_email, contact_phone,
                status, kyc_status, verified, pricing_scheme, commission_percent,
                absorbs_gateway_fees, admin_notes, rejection_reason,
                approved_by, approved_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(*partner.id.as_uuid())
        .bind(*partner.user_id.as_uuid())
        .bind(&partner.business_name)
        .bind(&partner.contact_email)
        .bind(&partner.contact_phone)
        .bind(partner.status.as_str())
        .bind(partner.kyc_status.to_string())
        .bind(partner.verified)
        .bind(scheme)
        .bind(percent)
        .bind(partner.absorbs_gateway_fees)
        .bind(&partner.admin_notes)
        .bind(&partner.rejection_reason)
        .bind(partner.approved_by.map(|u| *u.as_uuid()))
        .bind(partner.approved_at)
        .bind(partner.created_at)
        .bind(partner.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: PartnerId, patch: PartnerPatch) -> Result<Partner, PortError> {
        let mut qb = QueryBuilder::new("UPDATE partners SET updated_at = now()");

        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(kyc_status) = patch.kyc_status {
            qb.push(", kyc_status = ").push_bind(kyc_status.to_string());
        }
        if let Some(verified) = patch.verified {
            qb.push(", verified = ").push_bind(verified);
        }
        if let Some(pricing) = patch.pricing {
            let (scheme, percent) = pricing_columns(pricing);
            qb.push(", pricing_scheme = ").push_bind(scheme);
            qb.push(", commission_percent = ").push_bind(percent);
        }
        if let Some(admin_notes) = patch.admin_notes {
            qb.push(", admin_notes = ").push_bind(admin_notes);
        }
        if let Some(rejection_reason) = patch.rejection_reason {
            qb.push(", rejection_reason = ").push_bind(rejection_reason);
        }
        if let Some(approved_by) = patch.approved_by {
            qb.push(", approved_by = ")
                .push_bind(approved_by.map(|u| *u.as_uuid()));
        }
        if let Some(approved_at) = patch.approved_at {
            qb.push(", approved_at = ").push_bind(approved_at);
        }

        qb.push(" WHERE id = ").push_bind(*id.as_uuid());
        qb.push(" RETURNING ").push(PARTNER_COLUMNS);

        let row: Option<PartnerRow> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let row = row.ok_or_else(|| PortError::not_found("Partner", id))?;
        Ok(Partner::try_from(row)?)
    }

    async fn list_by_status(&self, status: PartnerStatus) -> Result<Vec<Partner>, PortError> {
        let rows: Vec<PartnerRow> = sqlx::query_as(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| Partner::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn add_document(&self, document: &KycDocument) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO kyc_documents (
                id, partner_id, document_type, storage_path,
                submitted_at, reviewed_at, reviewed_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*document.id.as_uuid())
        .bind(*document.partner_id.as_uuid())
        .bind(encode_document_type(&document.document_type))
        .bind(&document.storage_path)
        .bind(document.submitted_at)
        .bind(document.reviewed_at)
        .bind(document.reviewed_by.map(|u| *u.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn get_document(&self, id: KycDocumentId) -> Result<KycDocument, PortError> {
        let row: Option<KycDocumentRow> = sqlx::query_as(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM kyc_documents WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(KycDocument::from)
            .ok_or_else(|| PortError::not_found("KycDocument", id))
    }

    async fn list_documents(&self, partner_id: PartnerId) -> Result<Vec<KycDocument>, PortError> {
        let rows: Vec<KycDocumentRow> = sqlx::query_as(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM kyc_documents \
             WHERE partner_id = $1 ORDER BY submitted_at ASC"
        ))
        .bind(*partner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(KycDocument::from).collect())
    }

    async fn mark_document_reviewed(
        &self,
        id: KycDocumentId,
        reviewer: UserId,
    ) -> Result<(), PortError> {
        let result = sqlx::query(
            "UPDATE kyc_documents SET reviewed_at = now(), reviewed_by = $2 WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .bind(*reviewer.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("KycDocument", id));
        }
        Ok(())
    }
}
