//! Database-backed adapters for the core auth ports

pub mod auth;

pub use auth::PgAuthAdapter;
