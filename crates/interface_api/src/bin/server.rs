//! Ticketing Marketplace Core - API Server Binary
//!
//! This binary starts the HTTP API server for the ticketing marketplace core.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin ticketing-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 DATABASE_URL=postgres://... cargo run --bin ticketing-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_TRUSTED_FUNCTION_URL` - Base URL of the trusted payout functions
//! * `API_DISBURSEMENT_URL` / `API_DISBURSEMENT_API_KEY` - Disbursement provider
//! * `API_WEBHOOK_TOKEN` - Shared token expected on provider webhook calls
//! * `API_AUTH_ADMIN_URL` / `API_SERVICE_ROLE_KEY` - Auth provider admin API
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use infra_db::{create_pool, DatabaseConfig, DatabaseError, DatabasePool};
use interface_api::{config::ApiConfig, create_router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, establishes database connection,
/// and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - Database connection fails
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config()?;
    config.validate()?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Ticketing Marketplace Core API Server"
    );

    let pool = create_database_pool(&config.database_url).await?;

    verify_database(&pool).await?;

    let app = create_router(pool, config.clone())?;

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to default values if environment variables are not set.
fn load_config() -> Result<ApiConfig, Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env().unwrap_or_else(|_| {
        let mut config = ApiConfig::default();
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(secret) = std::env::var("API_JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = level;
        }
        config
    });

    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Creates a PostgreSQL connection pool.
async fn create_database_pool(database_url: &str) -> Result<DatabasePool, DatabaseError> {
    tracing::info!("Connecting to database...");

    let pool = create_pool(DatabaseConfig::new(database_url)).await?;

    tracing::info!("Database connection established");
    Ok(pool)
}

/// Verifies database connectivity before serving traffic.
///
/// Schema migrations are applied externally; this only checks that the
/// configured database answers.
async fn verify_database(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    tracing::info!("Database ready");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
