//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use core_kernel::{BankAccountId, Money, PartnerId, PayoutId, UserId};
use domain_banking::{BankAccount, BankChannel};
use domain_partner::{Partner, PartnerStatus};
use domain_payout::{Payout, PayoutStatus};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;

use crate::fixtures::{IdFixtures, MoneyFixtures, StringFixtures};

/// Builder for constructing test partners
pub struct PartnerBuilder {
    user_id: UserId,
    business_name: String,
    contact_email: String,
    contact_phone: Option<String>,
    status: PartnerStatus,
    custom_commission: Option<Decimal>,
}

impl Default for PartnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PartnerBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            user_id: IdFixtures::user_id(),
            business_name: StringFixtures::business_name().to_string(),
            contact_email: StringFixtures::contact_email().to_string(),
            contact_phone: None,
            status: PartnerStatus::Pending,
            custom_commission: None,
        }
    }

    /// Creates a builder seeded with random but realistic contact data
    ///
    /// Each partner gets a fresh user id, so bulk-seeding scenarios do not
    /// collide on the unique user constraint.
    pub fn randomized() -> Self {
        Self {
            user_id: UserId::new(),
            business_name: CompanyName().fake(),
            contact_email: SafeEmail().fake(),
            contact_phone: None,
            status: PartnerStatus::Pending,
            custom_commission: None,
        }
    }

    /// Sets the owning user ID
    pub fn with_user_id(mut self, id: UserId) -> Self {
        self.user_id = id;
        self
    }

    /// Sets the business name
    pub fn with_business_name(mut self, name: impl Into<String>) -> Self {
        self.business_name = name.into();
        self
    }

    /// Sets the contact email
    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = email.into();
        self
    }

    /// Sets the contact phone
    pub fn with_contact_phone(mut self, phone: impl Into<String>) -> Self {
        self.contact_phone = Some(phone.into());
        self
    }

    /// Targets a lifecycle state; the builder walks the legal transitions
    pub fn with_status(mut self, status: PartnerStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets a custom commission percentage
    pub fn with_custom_commission(mut self, percent: Decimal) -> Self {
        self.custom_commission = Some(percent);
        self
    }

    /// Builds the partner, walking legal transitions to reach the target
    /// status
    pub fn build(self) -> Partner {
        let mut partner = Partner::new(self.user_id, self.business_name, self.contact_email);
        partner.contact_phone = self.contact_phone;

        let admin = IdFixtures::admin_user_id();
        match self.status {
            PartnerStatus::Pending => {}
            PartnerStatus::Approved => {
                partner.approve(admin).expect("pending partner approves");
            }
            PartnerStatus::Rejected => {
                partner
                    .reject("built as rejected")
                    .expect("pending partner rejects");
            }
            PartnerStatus::Suspended => {
                partner.approve(admin).expect("pending partner approves");
                partner
                    .suspend("built as suspended")
                    .expect("approved partner suspends");
            }
        }

        if let Some(percent) = self.custom_commission {
            partner
                .set_custom_pricing(percent)
                .expect("builder commission must be in range");
        }

        partner
    }
}

/// Builder for constructing test bank accounts
pub struct BankAccountBuilder {
    id: Option<BankAccountId>,
    partner_id: PartnerId,
    channel: BankChannel,
    account_number: String,
    holder_name: String,
    is_primary: bool,
}

impl Default for BankAccountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BankAccountBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: None,
            partner_id: IdFixtures::partner_id(),
            channel: BankChannel::Bca,
            account_number: StringFixtures::account_number().to_string(),
            holder_name: StringFixtures::holder_name().to_string(),
            is_primary: false,
        }
    }

    /// Creates a builder with a random holder name
    pub fn randomized() -> Self {
        Self {
            holder_name: Name().fake(),
            ..Self::new()
        }
    }

    /// Sets the account ID
    pub fn with_id(mut self, id: BankAccountId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the owning partner
    pub fn with_partner_id(mut self, id: PartnerId) -> Self {
        self.partner_id = id;
        self
    }

    /// Sets the disbursement channel
    pub fn with_channel(mut self, channel: BankChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Sets the account number
    pub fn with_account_number(mut self, number: impl Into<String>) -> Self {
        self.account_number = number.into();
        self
    }

    /// Sets the holder name
    pub fn with_holder_name(mut self, name: impl Into<String>) -> Self {
        self.holder_name = name.into();
        self
    }

    /// Marks the account as the payout destination
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Builds the bank account
    pub fn build(self) -> BankAccount {
        let mut account = BankAccount::new(
            self.partner_id,
            self.channel,
            self.account_number,
            self.holder_name,
        );
        if let Some(id) = self.id {
            account.id = id;
        }
        account.is_primary = self.is_primary;
        account
    }
}

/// Builder for constructing test payouts
pub struct PayoutBuilder {
    id: Option<PayoutId>,
    partner_id: PartnerId,
    amount: Money,
    status: PayoutStatus,
    rejection_reason: Option<String>,
}

impl Default for PayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PayoutBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: None,
            partner_id: IdFixtures::partner_id(),
            amount: MoneyFixtures::idr_payout(),
            status: PayoutStatus::Requested,
            rejection_reason: None,
        }
    }

    /// Sets the payout ID
    pub fn with_id(mut self, id: PayoutId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the owning partner
    pub fn with_partner_id(mut self, id: PartnerId) -> Self {
        self.partner_id = id;
        self
    }

    /// Sets the amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Targets a payout state; the builder walks the legal transitions
    pub fn with_status(mut self, status: PayoutStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the rejection reason used when targeting the Rejected state
    pub fn with_rejection_reason(mut self, reason: impl Into<String>) -> Self {
        self.rejection_reason = Some(reason.into());
        self
    }

    /// Builds the payout, walking legal transitions to reach the target
    /// status
    pub fn build(self) -> Payout {
        let mut payout = match self.id {
            Some(id) => Payout::with_id(id, self.partner_id, self.amount),
            None => Payout::new(self.partner_id, self.amount),
        }
        .expect("builder amount must be positive");

        match self.status {
            PayoutStatus::Requested => {}
            PayoutStatus::Processing => {
                payout
                    .mark_processing(IdFixtures::disbursement_id())
                    .expect("requested payout starts processing");
            }
            PayoutStatus::Completed => {
                payout
                    .mark_processing(IdFixtures::disbursement_id())
                    .expect("requested payout starts processing");
                payout
                    .mark_completed()
                    .expect("processing payout completes");
            }
            PayoutStatus::Rejected => {
                let reason = self
                    .rejection_reason
                    .unwrap_or_else(|| "built as rejected".to_string());
                payout.reject(reason).expect("live payout rejects");
            }
        }

        payout
    }
}
