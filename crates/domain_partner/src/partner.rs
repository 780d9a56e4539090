//! Partner aggregate and lifecycle state machine
//!
//! A Partner is an event organizer selling tickets through the marketplace.
//! The aggregate carries two independent state axes:
//!
//! - **Account status** (`PartnerStatus`): whether the partner may operate.
//!   `Pending → Approved | Rejected`, `Approved → Suspended`,
//!   `Suspended → Approved`. No other edges exist.
//! - **KYC status** (`KycStatus`): where the identity-verification review
//!   stands. A successful KYC review is what normally approves the account;
//!   a failed review sends the account back to `Pending`.
//!
//! All transition methods are pure: they either mutate the aggregate in one
//! step or return `PartnerError::InvalidTransition` and leave it untouched.
//! Persistence happens afterwards as a single store update.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{PartnerId, Rate, UserId};

use crate::error::PartnerError;
use crate::kyc::KycStatus;

/// Standard platform commission, percent of gross ticket revenue
pub const STANDARD_COMMISSION_PERCENT: u32 = 15;

/// Account status of a partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    /// Registered, awaiting review; cannot operate
    Pending,
    /// Cleared to sell tickets and request payouts
    Approved,
    /// Review failed; terminal unless KYC is re-run
    Rejected,
    /// Temporarily barred by an admin
    Suspended,
}

impl PartnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerStatus::Pending => "pending",
            PartnerStatus::Approved => "approved",
            PartnerStatus::Rejected => "rejected",
            PartnerStatus::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for PartnerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commission pricing scheme for a partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum Pricing {
    /// The platform-wide standard rate
    Standard,
    /// A negotiated rate, percent of gross (0–100)
    Custom { percent: Decimal },
}

impl Pricing {
    /// Builds a custom scheme, rejecting percentages outside 0–100
    pub fn custom(percent: Decimal) -> Result<Self, PartnerError> {
        if percent < dec!(0) || percent > dec!(100) {
            return Err(PartnerError::InvalidPricing(percent));
        }
        Ok(Pricing::Custom { percent })
    }

    /// The effective commission percentage
    pub fn commission_percent(&self) -> Decimal {
        match self {
            Pricing::Standard => Decimal::from(STANDARD_COMMISSION_PERCENT),
            Pricing::Custom { percent } => *percent,
        }
    }

    /// The effective commission as a [`Rate`]
    pub fn commission_rate(&self) -> Rate {
        Rate::from_percentage(self.commission_percent())
    }

    pub fn is_standard(&self) -> bool {
        matches!(self, Pricing::Standard)
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Pricing::Standard
    }
}

/// The Partner aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    /// The auth identity that owns this partner account
    pub user_id: UserId,
    pub business_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub status: PartnerStatus,
    pub kyc_status: KycStatus,
    /// Legacy flag kept equal to `kyc_status == Verified`
    pub verified: bool,
    pub pricing: Pricing,
    /// When true the partner absorbs payment-gateway fees instead of the buyer
    pub absorbs_gateway_fees: bool,
    /// Free-form admin annotations (suspension reasons live here)
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    /// Admin who approved the account, recorded at KYC verification
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    /// Creates a freshly registered partner: Pending, KYC not started
    pub fn new(
        user_id: UserId,
        business_name: impl Into<String>,
        contact_email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PartnerId::new_v7(),
            user_id,
            business_name: business_name.into(),
            contact_email: contact_email.into(),
            contact_phone: None,
            status: PartnerStatus::Pending,
            kyc_status: KycStatus::NotStarted,
            verified: false,
            pricing: Pricing::Standard,
            absorbs_gateway_fees: false,
            admin_notes: None,
            rejection_reason: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the partner may sell tickets and request payouts
    pub fn can_operate(&self) -> bool {
        self.status == PartnerStatus::Approved
    }

    /// Pending → Approved
    pub fn approve(&mut self, admin: UserId) -> Result<(), PartnerError> {
        self.require_status(PartnerStatus::Pending, "approve")?;
        self.status = PartnerStatus::Approved;
        self.approved_by = Some(admin);
        self.approved_at = Some(Utc::now());
        self.rejection_reason = None;
        self.touch();
        Ok(())
    }

    /// Pending → Rejected
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), PartnerError> {
        self.require_status(PartnerStatus::Pending, "reject")?;
        self.status = PartnerStatus::Rejected;
        self.rejection_reason = Some(reason.into());
        self.touch();
        Ok(())
    }

    /// Approved → Suspended
    pub fn suspend(&mut self, reason: impl Into<String>) -> Result<(), PartnerError> {
        self.require_status(PartnerStatus::Approved, "suspend")?;
        self.status = PartnerStatus::Suspended;
        self.admin_notes = Some(reason.into());
        self.touch();
        Ok(())
    }

    /// Suspended → Approved, clearing the suspension note
    pub fn reactivate(&mut self) -> Result<(), PartnerError> {
        self.require_status(PartnerStatus::Suspended, "reactivate")?;
        self.status = PartnerStatus::Approved;
        self.admin_notes = None;
        self.touch();
        Ok(())
    }

    /// KYC NotStarted → PendingReview
    pub fn submit_kyc(&mut self) -> Result<(), PartnerError> {
        if self.kyc_status != KycStatus::NotStarted {
            return Err(PartnerError::invalid_transition(format!(
                "cannot submit KYC documents while review is {}",
                self.kyc_status
            )));
        }
        self.kyc_status = KycStatus::PendingReview;
        self.touch();
        Ok(())
    }

    /// KYC PendingReview → Verified; also approves the account
    ///
    /// Verification is the normal approval path: the account becomes
    /// Approved and the approver is recorded in the same step.
    pub fn verify_kyc(&mut self, admin: UserId) -> Result<(), PartnerError> {
        if self.kyc_status != KycStatus::PendingReview {
            return Err(PartnerError::invalid_transition(format!(
                "cannot verify KYC from {}",
                self.kyc_status
            )));
        }
        self.kyc_status = KycStatus::Verified;
        self.verified = true;
        self.status = PartnerStatus::Approved;
        self.approved_by = Some(admin);
        self.approved_at = Some(Utc::now());
        self.rejection_reason = None;
        self.touch();
        Ok(())
    }

    /// KYC PendingReview → Rejected; the account falls back to Pending
    ///
    /// A failed review never leaves the account Approved.
    pub fn reject_kyc(&mut self, reason: impl Into<String>) -> Result<(), PartnerError> {
        if self.kyc_status != KycStatus::PendingReview {
            return Err(PartnerError::invalid_transition(format!(
                "cannot reject KYC from {}",
                self.kyc_status
            )));
        }
        self.kyc_status = KycStatus::Rejected;
        self.verified = false;
        self.status = PartnerStatus::Pending;
        self.rejection_reason = Some(reason.into());
        self.touch();
        Ok(())
    }

    /// Switches to a custom commission percentage (0–100)
    pub fn set_custom_pricing(&mut self, percent: Decimal) -> Result<(), PartnerError> {
        self.pricing = Pricing::custom(percent)?;
        self.touch();
        Ok(())
    }

    /// Returns to standard pricing; a no-op if already standard
    pub fn reset_to_standard_pricing(&mut self) {
        if !self.pricing.is_standard() {
            self.pricing = Pricing::Standard;
            self.touch();
        }
    }

    fn require_status(
        &self,
        expected: PartnerStatus,
        operation: &str,
    ) -> Result<(), PartnerError> {
        if self.status != expected {
            return Err(PartnerError::invalid_transition(format!(
                "cannot {} partner in status {}",
                operation, self.status
            )));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_partner() -> Partner {
        Partner::new(UserId::new(), "Jakarta Jazz Collective", "ops@jjc.example")
    }

    #[test]
    fn test_new_partner_starts_pending() {
        let p = pending_partner();
        assert_eq!(p.status, PartnerStatus::Pending);
        assert_eq!(p.kyc_status, KycStatus::NotStarted);
        assert!(!p.verified);
        assert!(!p.can_operate());
        assert!(p.pricing.is_standard());
    }

    #[test]
    fn test_approve_from_pending() {
        let admin = UserId::new();
        let mut p = pending_partner();
        p.approve(admin).unwrap();
        assert_eq!(p.status, PartnerStatus::Approved);
        assert_eq!(p.approved_by, Some(admin));
        assert!(p.can_operate());
    }

    #[test]
    fn test_approve_twice_fails() {
        let mut p = pending_partner();
        p.approve(UserId::new()).unwrap();
        let err = p.approve(UserId::new()).unwrap_err();
        assert!(matches!(err, PartnerError::InvalidTransition(_)));
    }

    #[test]
    fn test_suspend_requires_approved() {
        let mut p = pending_partner();
        assert!(p.suspend("fraud review").is_err());

        p.approve(UserId::new()).unwrap();
        p.suspend("fraud review").unwrap();
        assert_eq!(p.status, PartnerStatus::Suspended);
        assert_eq!(p.admin_notes.as_deref(), Some("fraud review"));
    }

    #[test]
    fn test_reactivate_clears_notes() {
        let mut p = pending_partner();
        p.approve(UserId::new()).unwrap();
        p.suspend("chargeback spike").unwrap();
        p.reactivate().unwrap();
        assert_eq!(p.status, PartnerStatus::Approved);
        assert!(p.admin_notes.is_none());
    }

    #[test]
    fn test_reject_only_from_pending() {
        let mut p = pending_partner();
        p.approve(UserId::new()).unwrap();
        assert!(p.reject("incomplete documents").is_err());
    }

    #[test]
    fn test_kyc_verification_approves_account() {
        let admin = UserId::new();
        let mut p = pending_partner();
        p.submit_kyc().unwrap();
        p.verify_kyc(admin).unwrap();

        assert_eq!(p.kyc_status, KycStatus::Verified);
        assert!(p.verified);
        assert_eq!(p.status, PartnerStatus::Approved);
        assert_eq!(p.approved_by, Some(admin));
    }

    #[test]
    fn test_kyc_rejection_returns_to_pending() {
        let mut p = pending_partner();
        p.submit_kyc().unwrap();
        p.reject_kyc("blurry ID scan").unwrap();

        assert_eq!(p.kyc_status, KycStatus::Rejected);
        assert!(!p.verified);
        assert_eq!(p.status, PartnerStatus::Pending);
        assert_eq!(p.rejection_reason.as_deref(), Some("blurry ID scan"));
    }

    #[test]
    fn test_kyc_cannot_be_verified_before_submission() {
        let mut p = pending_partner();
        assert!(p.verify_kyc(UserId::new()).is_err());
    }

    #[test]
    fn test_custom_pricing_bounds() {
        let mut p = pending_partner();
        assert!(p.set_custom_pricing(dec!(101)).is_err());
        assert!(p.set_custom_pricing(dec!(-0.5)).is_err());

        p.set_custom_pricing(dec!(12.5)).unwrap();
        assert_eq!(p.pricing.commission_percent(), dec!(12.5));
    }

    #[test]
    fn test_standard_pricing_reset_is_idempotent() {
        let mut p = pending_partner();
        p.set_custom_pricing(dec!(10)).unwrap();
        p.reset_to_standard_pricing();
        let stamp = p.updated_at;

        p.reset_to_standard_pricing();
        assert!(p.pricing.is_standard());
        assert_eq!(p.updated_at, stamp);
    }

    #[test]
    fn test_standard_rate_is_fifteen_percent() {
        assert_eq!(Pricing::Standard.commission_percent(), dec!(15));
    }
}
