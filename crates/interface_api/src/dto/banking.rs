//! Bank account DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::BankAccountId;
use domain_banking::{AddBankAccountRequest, BankAccount, BankChannel};

/// Body for registering a disbursement destination
#[derive(Debug, Deserialize)]
pub struct AddBankAccountBody {
    pub channel: BankChannel,
    pub account_number: String,
    pub holder_name: String,
    #[serde(default)]
    pub make_primary: bool,
}

impl From<AddBankAccountBody> for AddBankAccountRequest {
    fn from(body: AddBankAccountBody) -> Self {
        AddBankAccountRequest {
            channel: body.channel,
            account_number: body.account_number,
            holder_name: body.holder_name,
            make_primary: body.make_primary,
        }
    }
}

/// A bank account as returned to clients
///
/// The account number is always masked on the way out.
#[derive(Debug, Serialize)]
pub struct BankAccountResponse {
    pub id: BankAccountId,
    pub channel: BankChannel,
    pub bank_name: &'static str,
    pub account_number_masked: String,
    pub holder_name: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl From<BankAccount> for BankAccountResponse {
    fn from(account: BankAccount) -> Self {
        Self {
            id: account.id,
            channel: account.channel,
            bank_name: account.bank_name(),
            account_number_masked: account.masked_account_number(),
            holder_name: account.holder_name,
            is_primary: account.is_primary,
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PartnerId;

    #[test]
    fn test_response_never_exposes_full_account_number() {
        let account = BankAccount::new(PartnerId::new(), BankChannel::Bca, "1234567890", "Dewi");
        let json = serde_json::to_string(&BankAccountResponse::from(account)).unwrap();

        assert!(!json.contains("1234567890"));
        assert!(json.contains("******7890"));
    }

    #[test]
    fn test_make_primary_defaults_to_false() {
        let body: AddBankAccountBody = serde_json::from_str(
            r#"{"channel":"bca","account_number":"1234567890","holder_name":"Dewi"}"#,
        )
        .unwrap();
        assert!(!body.make_primary);
    }
}
