//! Production adapters for the payout domain's external boundaries

pub mod http_disbursement;
pub mod trusted_function;

pub use http_disbursement::{HttpDisbursementProvider, HttpDisbursementConfig};
pub use trusted_function::{TrustedFunctionClient, TrustedFunctionConfig};
