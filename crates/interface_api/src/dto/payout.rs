//! Payout DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DisbursementId, PartnerId, PayoutId};
use domain_payout::{ExecutorReceipt, Payout, PayoutStatus};

/// Body for requesting a payout
#[derive(Debug, Deserialize)]
pub struct RequestPayoutBody {
    pub amount: Decimal,
    /// ISO currency code; defaults to IDR
    pub currency: Option<String>,
}

/// Webhook event from the disbursement provider
///
/// Delivery is at least once; the handlers treat replays as no-ops.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DisbursementWebhookBody {
    /// A disbursement was issued for the payout
    Issued {
        payout_id: PayoutId,
        disbursement_id: DisbursementId,
    },
    /// The transfer was confirmed at the destination bank
    Completed { payout_id: PayoutId },
    /// The transfer failed after acceptance
    Failed { payout_id: PayoutId, reason: String },
}

/// A payout as returned to clients
#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub id: PayoutId,
    pub partner_id: PartnerId,
    pub amount: Decimal,
    pub currency: &'static str,
    pub status: PayoutStatus,
    pub rejection_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Payout> for PayoutResponse {
    fn from(payout: Payout) -> Self {
        Self {
            id: payout.id,
            partner_id: payout.partner_id,
            amount: payout.amount.amount(),
            currency: payout.amount.currency().code(),
            status: payout.status,
            rejection_reason: payout.rejection_reason,
            requested_at: payout.created_at,
            processed_at: payout.processed_at,
            completed_at: payout.completed_at,
        }
    }
}

/// Receipt from an approval forwarded to the trusted function
#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub payout_id: PayoutId,
    pub status: PayoutStatus,
    pub message: Option<String>,
}

impl From<ExecutorReceipt> for ApprovalResponse {
    fn from(receipt: ExecutorReceipt) -> Self {
        Self {
            payout_id: receipt.payout_id,
            status: receipt.status,
            message: receipt.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_event_parsing() {
        let raw = format!(
            r#"{{"event":"issued","payout_id":"{}","disbursement_id":"{}"}}"#,
            uuid::Uuid::now_v7(),
            uuid::Uuid::now_v7()
        );
        let body: DisbursementWebhookBody = serde_json::from_str(&raw).unwrap();
        assert!(matches!(body, DisbursementWebhookBody::Issued { .. }));

        let failed = format!(
            r#"{{"event":"failed","payout_id":"{}","reason":"account closed"}}"#,
            uuid::Uuid::now_v7()
        );
        let body: DisbursementWebhookBody = serde_json::from_str(&failed).unwrap();
        assert!(
            matches!(body, DisbursementWebhookBody::Failed { reason, .. } if reason == "account closed")
        );
    }
}
