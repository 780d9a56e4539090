//! API configuration

use core_kernel::CoreError;
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for session tokens
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Base URL of the trusted payout functions
    pub trusted_function_url: String,
    /// Base URL of the disbursement provider API
    pub disbursement_url: String,
    /// Disbursement provider API key
    pub disbursement_api_key: String,
    /// Shared token the disbursement provider sends on webhook calls
    pub webhook_token: String,
    /// Base URL of the auth provider's admin API
    pub auth_admin_url: String,
    /// Service-role key for the auth provider's admin API
    pub service_role_key: String,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/ticketing".to_string(),
            trusted_function_url: "http://localhost:9000/functions".to_string(),
            disbursement_url: "https://api.disbursement.example".to_string(),
            disbursement_api_key: String::new(),
            webhook_token: String::new(),
            auth_admin_url: "http://localhost:9000/auth".to_string(),
            service_role_key: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks the values a running server cannot do without
    ///
    /// The webhook token and service-role key default to empty so local
    /// setups without a provider still boot; everything here is required.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(CoreError::configuration("api.jwt_secret", "must not be empty"));
        }
        if self.database_url.trim().is_empty() {
            return Err(CoreError::configuration(
                "api.database_url",
                "must not be empty",
            ));
        }
        if self.trusted_function_url.trim().is_empty() {
            return Err(CoreError::configuration(
                "api.trusted_function_url",
                "must not be empty",
            ));
        }
        Ok(())
    }
}
