//! Request and response data transfer objects

pub mod banking;
pub mod partner;
pub mod payout;
