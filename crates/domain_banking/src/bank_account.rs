//! Bank account entity and disbursement channels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BankAccountId, PartnerId};

/// Banks the disbursement provider can pay out to
///
/// The variant set mirrors the provider's supported channel list; the wire
/// code is what goes into a disbursement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankChannel {
    Bca,
    Bni,
    Bri,
    Mandiri,
    Permata,
    CimbNiaga,
}

impl BankChannel {
    /// The provider's channel code
    pub fn code(&self) -> &'static str {
        match self {
            BankChannel::Bca => "BCA",
            BankChannel::Bni => "BNI",
            BankChannel::Bri => "BRI",
            BankChannel::Mandiri => "MANDIRI",
            BankChannel::Permata => "PERMATA",
            BankChannel::CimbNiaga => "CIMB",
        }
    }

    /// Human-readable bank name for receipts and dashboards
    pub fn display_name(&self) -> &'static str {
        match self {
            BankChannel::Bca => "Bank Central Asia",
            BankChannel::Bni => "Bank Negara Indonesia",
            BankChannel::Bri => "Bank Rakyat Indonesia",
            BankChannel::Mandiri => "Bank Mandiri",
            BankChannel::Permata => "Bank Permata",
            BankChannel::CimbNiaga => "CIMB Niaga",
        }
    }
}

impl std::str::FromStr for BankChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BCA" => Ok(BankChannel::Bca),
            "BNI" => Ok(BankChannel::Bni),
            "BRI" => Ok(BankChannel::Bri),
            "MANDIRI" => Ok(BankChannel::Mandiri),
            "PERMATA" => Ok(BankChannel::Permata),
            "CIMB" | "CIMB_NIAGA" => Ok(BankChannel::CimbNiaga),
            other => Err(format!("unknown bank channel: {other}")),
        }
    }
}

impl std::fmt::Display for BankChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A partner's registered disbursement destination
///
/// At most one account per partner is primary; payouts always go to the
/// primary account. The store enforces the invariant with an atomic swap,
/// never an unmark-then-mark pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: BankAccountId,
    pub partner_id: PartnerId,
    pub channel: BankChannel,
    pub account_number: String,
    pub holder_name: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl BankAccount {
    pub fn new(
        partner_id: PartnerId,
        channel: BankChannel,
        account_number: impl Into<String>,
        holder_name: impl Into<String>,
    ) -> Self {
        Self {
            id: BankAccountId::new_v7(),
            partner_id,
            channel,
            account_number: account_number.into(),
            holder_name: holder_name.into(),
            is_primary: false,
            created_at: Utc::now(),
        }
    }

    /// Bank display name for this account's channel
    pub fn bank_name(&self) -> &'static str {
        self.channel.display_name()
    }

    /// Account number with all but the last four digits masked
    pub fn masked_account_number(&self) -> String {
        let len = self.account_number.len();
        if len <= 4 {
            return self.account_number.clone();
        }
        format!("{}{}", "*".repeat(len - 4), &self.account_number[len - 4..])
    }
}
