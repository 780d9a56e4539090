//! Comprehensive tests for domain_banking

use core_kernel::PartnerId;
use domain_banking::bank_account::{BankAccount, BankChannel};

mod channels {
    use super::*;

    #[test]
    fn codes_match_provider_list() {
        assert_eq!(BankChannel::Bca.code(), "BCA");
        assert_eq!(BankChannel::Mandiri.code(), "MANDIRI");
        assert_eq!(BankChannel::CimbNiaga.code(), "CIMB");
    }

    #[test]
    fn display_names_are_full_bank_names() {
        assert_eq!(BankChannel::Bri.display_name(), "Bank Rakyat Indonesia");
        assert_eq!(BankChannel::Permata.display_name(), "Bank Permata");
    }

    #[test]
    fn legacy_cimb_spelling_parses() {
        let parsed: BankChannel = "cimb_niaga".parse().unwrap();
        assert_eq!(parsed, BankChannel::CimbNiaga);
    }
}

mod accounts {
    use super::*;

    #[test]
    fn masking_keeps_last_four_digits() {
        let account = BankAccount::new(
            PartnerId::new(),
            BankChannel::Bni,
            "0987654321",
            "Agus Prasetyo",
        );
        let masked = account.masked_account_number();
        assert!(masked.ends_with("4321"));
        assert!(!masked.contains("098765"));
        assert_eq!(masked.len(), account.account_number.len());
    }

    #[test]
    fn short_numbers_are_not_masked_into_nothing() {
        let account = BankAccount::new(PartnerId::new(), BankChannel::Bca, "1234", "A B");
        assert_eq!(account.masked_account_number(), "1234");
    }

    #[test]
    fn bank_name_follows_channel() {
        let account = BankAccount::new(PartnerId::new(), BankChannel::Mandiri, "55555", "C D");
        assert_eq!(account.bank_name(), "Bank Mandiri");
    }
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn masked_number_never_reveals_leading_digits(
            number in "[0-9]{5,20}"
        ) {
            let account = BankAccount::new(
                PartnerId::new(),
                BankChannel::Bca,
                number.clone(),
                "Holder Name",
            );
            let masked = account.masked_account_number();
            prop_assert_eq!(masked.len(), number.len());
            if number.len() > 4 {
                let hidden = &masked[..number.len() - 4];
                prop_assert!(hidden.chars().all(|c| c == '*'));
            }
        }
    }
}
