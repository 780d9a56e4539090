//! KYC (Know Your Customer) review records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{KycDocumentId, PartnerId, UserId};

/// Where a partner's identity review stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// No documents submitted yet
    NotStarted,
    /// Documents submitted, awaiting an admin decision
    PendingReview,
    /// Identity verified; the account is approved
    Verified,
    /// Review failed; the partner may resubmit
    Rejected,
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            KycStatus::NotStarted => "not_started",
            KycStatus::PendingReview => "pending_review",
            KycStatus::Verified => "verified",
            KycStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// An admin's verdict on a pending review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycDecision {
    Approve,
    Reject,
}

/// Document type for KYC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycDocumentType {
    NationalId,
    TaxId,
    BusinessLicense,
    BankStatement,
    Other(String),
}

/// A submitted identity document
///
/// The document body lives in object storage; only the storage path is kept
/// here. Admins view documents through short-lived signed URLs issued by the
/// privileged auth capability, never through a public link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycDocument {
    pub id: KycDocumentId,
    pub partner_id: PartnerId,
    pub document_type: KycDocumentType,
    /// Private object-storage path, not a URL
    pub storage_path: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<UserId>,
}

impl KycDocument {
    pub fn new(
        partner_id: PartnerId,
        document_type: KycDocumentType,
        storage_path: impl Into<String>,
    ) -> Self {
        Self {
            id: KycDocumentId::new_v7(),
            partner_id,
            document_type,
            storage_path: storage_path.into(),
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    /// Stamps the document with the reviewing admin
    pub fn mark_reviewed(&mut self, reviewer: UserId) {
        self.reviewed_at = Some(Utc::now());
        self.reviewed_by = Some(reviewer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_review_stamp() {
        let reviewer = UserId::new();
        let mut doc = KycDocument::new(
            PartnerId::new(),
            KycDocumentType::NationalId,
            "kyc/PTR-1/ktp.jpg",
        );
        assert!(doc.reviewed_at.is_none());

        doc.mark_reviewed(reviewer);
        assert_eq!(doc.reviewed_by, Some(reviewer));
        assert!(doc.reviewed_at.is_some());
    }
}
