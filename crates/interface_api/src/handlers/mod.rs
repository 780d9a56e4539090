//! Request handlers

pub mod banking;
pub mod health;
pub mod partner;
pub mod payout;
