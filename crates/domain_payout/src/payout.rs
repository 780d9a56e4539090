//! Payout entity and state machine
//!
//! A payout moves a partner's ticket revenue to their primary bank account.
//! The status machine is deliberately small:
//!
//! ```text
//! Requested ──→ Processing ──→ Completed
//!     │              │
//!     └──────────────┴──→ Rejected
//! ```
//!
//! `Completed` and `Rejected` are terminal. Replaying the transition that
//! produced a terminal state is an idempotent no-op (webhooks are delivered
//! at least once); any other transition out of a terminal state fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DisbursementId, Money, PartnerId, PayoutId};

use crate::error::PayoutError;

/// Status of a payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Requested by the partner, awaiting admin approval
    Requested,
    /// Approved; a disbursement has been issued to the provider
    Processing,
    /// The provider confirmed the transfer
    Completed,
    /// Refused by an admin or failed at the provider
    Rejected,
}

impl PayoutStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutStatus::Completed | PayoutStatus::Rejected)
    }
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PayoutStatus::Requested => "requested",
            PayoutStatus::Processing => "processing",
            PayoutStatus::Completed => "completed",
            PayoutStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// A partner's payout request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub id: PayoutId,
    pub partner_id: PartnerId,
    pub amount: Money,
    pub status: PayoutStatus,
    pub rejection_reason: Option<String>,
    /// Idempotency key of the disbursement issued for this payout
    pub disbursement_id: Option<DisbursementId>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payout {
    /// Creates a new payout request; the amount must be strictly positive
    pub fn new(partner_id: PartnerId, amount: Money) -> Result<Self, PayoutError> {
        if !amount.is_positive() {
            return Err(PayoutError::InvalidAmount(amount.amount()));
        }
        let now = Utc::now();
        Ok(Self {
            id: PayoutId::new_v7(),
            partner_id,
            amount,
            status: PayoutStatus::Requested,
            rejection_reason: None,
            disbursement_id: None,
            processed_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a payout recorded elsewhere under a known ID
    pub fn with_id(id: PayoutId, partner_id: PartnerId, amount: Money) -> Result<Self, PayoutError> {
        let mut payout = Self::new(partner_id, amount)?;
        payout.id = id;
        Ok(payout)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Requested → Processing, recording the disbursement issued for it
    ///
    /// Replaying the same disbursement id against an already-Processing
    /// payout is a no-op; a different id is a conflict.
    pub fn mark_processing(
        &mut self,
        disbursement_id: DisbursementId,
    ) -> Result<(), PayoutError> {
        match self.status {
            PayoutStatus::Requested => {
                self.status = PayoutStatus::Processing;
                self.disbursement_id = Some(disbursement_id);
                self.processed_at = Some(Utc::now());
                self.touch();
                Ok(())
            }
            PayoutStatus::Processing if self.disbursement_id == Some(disbursement_id) => Ok(()),
            _ => Err(PayoutError::invalid_transition(format!(
                "cannot mark payout {} processing from {}",
                self.id, self.status
            ))),
        }
    }

    /// Processing → Completed; replaying against Completed is a no-op
    pub fn mark_completed(&mut self) -> Result<(), PayoutError> {
        match self.status {
            PayoutStatus::Processing => {
                self.status = PayoutStatus::Completed;
                self.completed_at = Some(Utc::now());
                self.touch();
                Ok(())
            }
            PayoutStatus::Completed => Ok(()),
            _ => Err(PayoutError::invalid_transition(format!(
                "cannot complete payout {} from {}",
                self.id, self.status
            ))),
        }
    }

    /// {Requested, Processing} → Rejected; replaying against Rejected is a
    /// no-op that keeps the original reason
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), PayoutError> {
        match self.status {
            PayoutStatus::Requested | PayoutStatus::Processing => {
                self.status = PayoutStatus::Rejected;
                self.rejection_reason = Some(reason.into());
                self.touch();
                Ok(())
            }
            PayoutStatus::Rejected => Ok(()),
            PayoutStatus::Completed => Err(PayoutError::invalid_transition(format!(
                "cannot reject completed payout {}",
                self.id
            ))),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn requested() -> Payout {
        Payout::new(
            PartnerId::new(),
            Money::new(dec!(500000), Currency::IDR),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_and_negative_amounts_refused() {
        let zero = Payout::new(PartnerId::new(), Money::zero(Currency::IDR));
        assert!(matches!(zero, Err(PayoutError::InvalidAmount(_))));

        let negative = Payout::new(
            PartnerId::new(),
            Money::new(dec!(-1000), Currency::IDR),
        );
        assert!(matches!(negative, Err(PayoutError::InvalidAmount(_))));
    }

    #[test]
    fn test_happy_path_to_completed() {
        let disbursement = DisbursementId::new();
        let mut p = requested();

        p.mark_processing(disbursement).unwrap();
        assert_eq!(p.status, PayoutStatus::Processing);
        assert_eq!(p.disbursement_id, Some(disbursement));
        assert!(p.processed_at.is_some());

        p.mark_completed().unwrap();
        assert_eq!(p.status, PayoutStatus::Completed);
        assert!(p.is_terminal());
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut p = requested();
        p.mark_processing(DisbursementId::new()).unwrap();
        p.mark_completed().unwrap();

        // Replay of the terminal transition is a no-op
        assert!(p.mark_completed().is_ok());
        // Everything else out of a terminal state fails
        assert!(p.reject("too late").is_err());
        assert!(p.mark_processing(DisbursementId::new()).is_err());
    }

    #[test]
    fn test_rejected_replay_keeps_original_reason() {
        let mut p = requested();
        p.reject("Insufficient balance").unwrap();
        p.reject("different reason").unwrap();

        assert_eq!(p.rejection_reason.as_deref(), Some("Insufficient balance"));
        assert!(p.mark_completed().is_err());
    }

    #[test]
    fn test_processing_webhook_replay_is_idempotent() {
        let disbursement = DisbursementId::new();
        let mut p = requested();
        p.mark_processing(disbursement).unwrap();
        let stamp = p.processed_at;

        // Same disbursement delivered twice
        p.mark_processing(disbursement).unwrap();
        assert_eq!(p.processed_at, stamp);

        // A different disbursement for the same payout is a conflict
        assert!(p.mark_processing(DisbursementId::new()).is_err());
    }

    #[test]
    fn test_cannot_complete_before_processing() {
        let mut p = requested();
        assert!(p.mark_completed().is_err());
    }

    #[test]
    fn test_reject_from_processing() {
        let mut p = requested();
        p.mark_processing(DisbursementId::new()).unwrap();
        p.reject("provider failure: account closed").unwrap();
        assert_eq!(p.status, PayoutStatus::Rejected);
    }
}
