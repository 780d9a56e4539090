//! Partner DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{KycDocumentId, PartnerId, UserId};
use domain_partner::kyc::{KycDecision, KycDocument, KycDocumentType, KycStatus};
use domain_partner::partner::{Partner, PartnerStatus, Pricing};

/// Body for partner registration
#[derive(Debug, Deserialize)]
pub struct RegisterPartnerBody {
    pub business_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
}

/// Body carrying an admin's free-form reason
#[derive(Debug, Deserialize)]
pub struct ReasonBody {
    pub reason: String,
}

/// Body for a KYC review verdict
#[derive(Debug, Deserialize)]
pub struct KycReviewBody {
    pub decision: KycDecision,
    pub reason: Option<String>,
}

/// Body for submitting KYC documents
#[derive(Debug, Deserialize)]
pub struct SubmitKycBody {
    pub documents: Vec<SubmitKycDocument>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitKycDocument {
    pub document_type: KycDocumentType,
    pub storage_path: String,
}

/// Body for changing a partner's commission scheme
#[derive(Debug, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum PricingBody {
    Standard,
    Custom { percent: Decimal },
}

/// Query for admin partner listings
#[derive(Debug, Deserialize)]
pub struct PartnerListQuery {
    pub status: PartnerStatus,
}

/// A partner as returned to clients
#[derive(Debug, Serialize)]
pub struct PartnerResponse {
    pub id: PartnerId,
    pub user_id: UserId,
    pub business_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub status: PartnerStatus,
    pub kyc_status: KycStatus,
    pub verified: bool,
    pub commission_percent: Decimal,
    pub custom_pricing: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Partner> for PartnerResponse {
    fn from(partner: Partner) -> Self {
        Self {
            id: partner.id,
            user_id: partner.user_id,
            business_name: partner.business_name,
            contact_email: partner.contact_email,
            contact_phone: partner.contact_phone,
            status: partner.status,
            kyc_status: partner.kyc_status,
            verified: partner.verified,
            commission_percent: partner.pricing.commission_percent(),
            custom_pricing: !partner.pricing.is_standard(),
            rejection_reason: partner.rejection_reason,
            created_at: partner.created_at,
            updated_at: partner.updated_at,
        }
    }
}

/// A KYC document as returned to clients
///
/// The storage path stays server-side; admins fetch a short-lived signed URL
/// through a separate endpoint.
#[derive(Debug, Serialize)]
pub struct KycDocumentResponse {
    pub id: KycDocumentId,
    pub partner_id: PartnerId,
    pub document_type: KycDocumentType,
    pub submitted_at: DateTime<Utc>,
    pub reviewed: bool,
}

impl From<KycDocument> for KycDocumentResponse {
    fn from(document: KycDocument) -> Self {
        Self {
            id: document.id,
            partner_id: document.partner_id,
            document_type: document.document_type,
            submitted_at: document.submitted_at,
            reviewed: document.reviewed_at.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::UserId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partner_response_flattens_pricing() {
        let mut partner = Partner::new(UserId::new(), "Bali Beats", "crew@balibeats.example");
        partner.pricing = Pricing::custom(dec!(10)).unwrap();

        let response = PartnerResponse::from(partner);
        assert_eq!(response.commission_percent, dec!(10));
        assert!(response.custom_pricing);
    }

    #[test]
    fn test_document_response_hides_storage_path() {
        let document = KycDocument::new(
            PartnerId::new(),
            KycDocumentType::NationalId,
            "kyc/private/ktp.jpg",
        );
        let json = serde_json::to_string(&KycDocumentResponse::from(document)).unwrap();
        assert!(!json.contains("storage_path"));
        assert!(!json.contains("kyc/private"));
    }

    #[test]
    fn test_pricing_body_parses_both_schemes() {
        let standard: PricingBody = serde_json::from_str(r#"{"scheme":"standard"}"#).unwrap();
        assert!(matches!(standard, PricingBody::Standard));

        let custom: PricingBody =
            serde_json::from_str(r#"{"scheme":"custom","percent":"12.5"}"#).unwrap();
        assert!(matches!(custom, PricingBody::Custom { percent } if percent == dec!(12.5)));
    }
}
