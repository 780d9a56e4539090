//! Core Kernel - Foundational types and utilities for the ticketing marketplace core
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Port infrastructure (errors, health checks, operation metadata)
//! - Auth ports: session/identity lookups and the privileged capability

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;
pub mod auth;

pub use money::{Money, Currency, Rate, MoneyError};
pub use identifiers::{
    UserId, PartnerId, BankAccountId, PayoutId, DisbursementId, KycDocumentId,
};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata, CircuitBreakerConfig,
};
pub use auth::{Session, UserIdentity, AuthPort, PrivilegedAuth, SignedUrl};
#[cfg(any(test, feature = "mock"))]
pub use auth::mock::{MockAuthPort, MockPrivilegedAuth};
