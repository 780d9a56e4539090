//! HTTP API Layer
//!
//! This crate provides the REST API for the ticketing marketplace core
//! using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each domain
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! Sessions are built from the bearer token at the edge. The token never
//! carries roles; every privileged operation re-reads the admin flag
//! through the auth port inside the domain managers.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{config::ApiConfig, create_router};
//!
//! let app = create_router(pool, config)?;
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod privileged;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::PrivilegedAuth;
use domain_banking::BankAccountManager;
use domain_partner::PartnerLifecycleManager;
use domain_payout::{PayoutManager, TrustedFunctionClient, TrustedFunctionConfig};
use infra_db::{PgAuthAdapter, PgBankAccountStore, PgPartnerStore, PgPayoutStore};

use crate::config::ApiConfig;
use crate::handlers::{banking, health, partner, payout};
use crate::middleware::{audit_middleware, auth_middleware};
use crate::privileged::HttpPrivilegedAuth;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub partners: Arc<PartnerLifecycleManager>,
    pub banking: Arc<BankAccountManager>,
    pub payouts: Arc<PayoutManager>,
    pub privileged: Arc<dyn PrivilegedAuth>,
    pub pool: PgPool,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the Postgres stores, auth adapters, and the trusted function
    /// client into the domain managers
    pub fn new(pool: PgPool, config: ApiConfig) -> anyhow::Result<Self> {
        let partners_store = Arc::new(PgPartnerStore::new(pool.clone()));
        let accounts_store = Arc::new(PgBankAccountStore::new(pool.clone()));
        let payouts_store = Arc::new(PgPayoutStore::new(pool.clone()));
        let auth = Arc::new(PgAuthAdapter::new(pool.clone()));

        let executor = Arc::new(TrustedFunctionClient::new(TrustedFunctionConfig {
            base_url: config.trusted_function_url.clone(),
            ..TrustedFunctionConfig::default()
        })?);

        let privileged: Arc<dyn PrivilegedAuth> = Arc::new(HttpPrivilegedAuth::new(
            config.auth_admin_url.clone(),
            config.service_role_key.clone(),
        )?);

        Ok(Self {
            partners: Arc::new(PartnerLifecycleManager::new(
                partners_store.clone(),
                auth.clone(),
            )),
            banking: Arc::new(BankAccountManager::new(
                accounts_store.clone(),
                partners_store.clone(),
                auth.clone(),
            )),
            payouts: Arc::new(PayoutManager::new(
                payouts_store,
                accounts_store,
                auth,
                executor,
            )),
            privileged,
            pool,
            config,
        })
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> anyhow::Result<Router> {
    let state = AppState::new(pool, config)?;
    Ok(router_with_state(state))
}

/// Builds the router over an already-wired state (used by tests)
pub fn router_with_state(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Public API routes: registration bootstrap and the provider webhook,
    // which authenticates with a shared token instead of a session
    let public_api_routes = Router::new()
        .route("/partners/register", post(partner::register_partner))
        .route(
            "/webhooks/disbursements",
            post(payout::disbursement_webhook),
        );

    // Partner routes
    let partner_routes = Router::new()
        .route("/", get(partner::list_partners))
        .route("/me", get(partner::get_my_partner))
        .route("/me/kyc", post(partner::submit_kyc))
        .route("/me/kyc", get(partner::list_my_kyc_documents))
        .route("/:id/approve", post(partner::approve_partner))
        .route("/:id/reject", post(partner::reject_partner))
        .route("/:id/suspend", post(partner::suspend_partner))
        .route("/:id/reactivate", post(partner::reactivate_partner))
        .route("/:id/kyc-review", post(partner::review_kyc))
        .route("/:id/pricing", put(partner::set_pricing));

    // KYC document routes (admin review)
    let kyc_document_routes = Router::new().route(
        "/:id/signed-url",
        get(partner::signed_kyc_document_url),
    );

    // Bank account routes
    let bank_account_routes = Router::new()
        .route("/", post(banking::add_bank_account))
        .route("/", get(banking::list_bank_accounts))
        .route("/:id/primary", post(banking::set_primary_bank_account))
        .route("/:id", delete(banking::delete_bank_account));

    // Payout routes
    let payout_routes = Router::new()
        .route("/", post(payout::request_payout))
        .route("/", get(payout::list_payouts))
        .route("/:id/approve", post(payout::approve_payout))
        .route("/:id/reject", post(payout::reject_payout));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/partners", partner_routes)
        .nest("/kyc-documents", kyc_document_routes)
        .nest("/bank-accounts", bank_account_routes)
        .nest("/payouts", payout_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", public_api_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
