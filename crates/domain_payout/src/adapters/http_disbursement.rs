//! HTTP adapter for the disbursement provider
//!
//! Issues bank transfers through the provider's REST API. The adapter is
//! where the idempotency discipline is enforced mechanically: the request's
//! `external_id` rides along on every create call, and transport failures
//! come back as `DisbursementError::Transport` so no caller can mistake
//! "the wire died" for "the provider said no".
//!
//! A circuit breaker guards the provider: after enough consecutive
//! failures, calls short-circuit with `ServiceUnavailable` until the reset
//! window elapses.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use core_kernel::{
    AdapterHealth, CircuitBreakerConfig, DisbursementId, DomainPort, HealthCheckResult,
    HealthCheckable, PortError,
};

use crate::disbursement::{
    Disbursement, DisbursementError, DisbursementProvider, DisbursementRequest,
    DisbursementStatus,
};

/// Configuration for the disbursement provider adapter
#[derive(Debug, Clone)]
pub struct HttpDisbursementConfig {
    /// Base URL of the provider API
    pub base_url: String,
    /// API key, sent as HTTP basic auth username
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Circuit breaker configuration; None disables the breaker
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for HttpDisbursementConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: 30,
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}

/// Circuit breaker state for fault tolerance
#[derive(Debug)]
struct CircuitBreaker {
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    last_failure_time: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            last_failure_time: RwLock::new(None),
        }
    }

    async fn is_available(&self) -> bool {
        if !self.is_open.load(Ordering::Relaxed) {
            return true;
        }

        // Half-open once the reset window has elapsed
        let last_failure = self.last_failure_time.read().await;
        if let Some(time) = *last_failure {
            if time.elapsed() > Duration::from_secs(self.config.reset_timeout_secs) {
                return true;
            }
        }

        false
    }

    fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        let success = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if success >= self.config.success_threshold as u64 {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
        }
    }

    async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold as u64 {
            self.is_open.store(true, Ordering::Relaxed);
            *self.last_failure_time.write().await = Some(Instant::now());
        }
    }
}

/// Production implementation of [`DisbursementProvider`]
#[derive(Debug)]
pub struct HttpDisbursementProvider {
    config: HttpDisbursementConfig,
    client: reqwest::Client,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

#[derive(Debug, Serialize)]
struct CreateDisbursementBody {
    external_id: DisbursementId,
    amount: rust_decimal::Decimal,
    currency: String,
    bank_code: String,
    account_holder_name: String,
    account_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DisbursementBody {
    external_id: DisbursementId,
    id: Option<String>,
    status: String,
    failure_code: Option<String>,
}

impl DisbursementBody {
    fn into_disbursement(self) -> Result<Disbursement, DisbursementError> {
        let status = match self.status.as_str() {
            "PENDING" | "ISSUED" => DisbursementStatus::Issued,
            "COMPLETED" | "DISBURSED" => DisbursementStatus::Disbursed,
            "FAILED" => DisbursementStatus::Failed,
            other => {
                return Err(DisbursementError::Configuration(format!(
                    "provider returned unknown status {other:?}"
                )))
            }
        };
        Ok(Disbursement {
            external_id: self.external_id,
            provider_reference: self.id,
            status,
            failure_reason: self.failure_code,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

impl HttpDisbursementProvider {
    pub fn new(config: HttpDisbursementConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        let circuit_breaker = config
            .circuit_breaker
            .clone()
            .map(|cb| Arc::new(CircuitBreaker::new(cb)));
        Ok(Self {
            config,
            client,
            circuit_breaker,
        })
    }

    /// Whether the breaker is currently refusing calls
    pub async fn is_circuit_open(&self) -> bool {
        if let Some(ref cb) = self.circuit_breaker {
            !cb.is_available().await
        } else {
            false
        }
    }

    async fn guard(&self) -> Result<(), DisbursementError> {
        if let Some(ref cb) = self.circuit_breaker {
            if !cb.is_available().await {
                return Err(DisbursementError::Transport(PortError::ServiceUnavailable {
                    service: "disbursement provider (circuit open)".to_string(),
                }));
            }
        }
        Ok(())
    }

    async fn record(&self, outcome: &Result<Disbursement, DisbursementError>) {
        if let Some(ref cb) = self.circuit_breaker {
            match outcome {
                Ok(_) | Err(DisbursementError::Rejected(_)) => cb.record_success(),
                // Only infrastructure failures trip the breaker
                Err(_) => cb.record_failure().await,
            }
        }
    }

    async fn parse_response(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<Disbursement, DisbursementError> {
        let status = response.status();
        if status.is_success() {
            let body: DisbursementBody = response.json().await.map_err(|e| {
                DisbursementError::Transport(PortError::Internal {
                    message: format!("malformed response from {operation}"),
                    source: Some(Box::new(e)),
                })
            })?;
            return body.into_disbursement();
        }

        match status.as_u16() {
            401 | 403 => Err(DisbursementError::Configuration(
                "provider rejected the API key".to_string(),
            )),
            404 => Err(DisbursementError::Rejected(
                "disbursement not found".to_string(),
            )),
            429 => Err(DisbursementError::Transport(PortError::RateLimited {
                retry_after_secs: 60,
            })),
            code if (500..600).contains(&code) => {
                warn!(operation, code, "disbursement provider server error");
                Err(DisbursementError::Transport(PortError::ServiceUnavailable {
                    service: "disbursement provider".to_string(),
                }))
            }
            _ => {
                let message = match response.json::<ProviderErrorBody>().await {
                    Ok(body) => body.message,
                    Err(_) => format!("provider refused {operation}"),
                };
                Err(DisbursementError::Rejected(message))
            }
        }
    }
}

fn map_transport_error(operation: &str, error: reqwest::Error) -> DisbursementError {
    let port_error = if error.is_timeout() {
        PortError::Timeout {
            operation: operation.to_string(),
            duration_ms: 0,
        }
    } else {
        PortError::Connection {
            message: format!("{operation} failed in transit"),
            source: Some(Box::new(error)),
        }
    };
    DisbursementError::Transport(port_error)
}

impl DomainPort for HttpDisbursementProvider {}

#[async_trait]
impl DisbursementProvider for HttpDisbursementProvider {
    async fn create_disbursement(
        &self,
        request: DisbursementRequest,
    ) -> Result<Disbursement, DisbursementError> {
        self.guard().await?;

        let body = CreateDisbursementBody {
            external_id: request.external_id,
            amount: request.amount.amount(),
            currency: request.amount.currency().code().to_string(),
            bank_code: request.channel.code().to_string(),
            account_holder_name: request.holder_name,
            account_number: request.account_number,
            email_to: request.email,
            description: request.description,
        };
        let url = format!(
            "{}/disbursements",
            self.config.base_url.trim_end_matches('/')
        );

        let outcome = match self
            .client
            .post(&url)
            .basic_auth(&self.config.api_key, None::<&str>)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => self.parse_response("create_disbursement", response).await,
            Err(e) => Err(map_transport_error("create_disbursement", e)),
        };

        self.record(&outcome).await;
        outcome
    }

    async fn get_disbursement(
        &self,
        external_id: DisbursementId,
    ) -> Result<Disbursement, DisbursementError> {
        self.guard().await?;

        let url = format!(
            "{}/disbursements/{}",
            self.config.base_url.trim_end_matches('/'),
            external_id.as_uuid()
        );

        let outcome = match self
            .client
            .get(&url)
            .basic_auth(&self.config.api_key, None::<&str>)
            .send()
            .await
        {
            Ok(response) => self.parse_response("get_disbursement", response).await,
            Err(e) => Err(map_transport_error("get_disbursement", e)),
        };

        self.record(&outcome).await;
        outcome
    }
}

#[async_trait]
impl HealthCheckable for HttpDisbursementProvider {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        let status = if self.is_circuit_open().await {
            AdapterHealth::Degraded
        } else {
            AdapterHealth::Healthy
        };

        HealthCheckResult {
            adapter_id: "http-disbursement-provider".to_string(),
            status,
            latency_ms: start.elapsed().as_millis() as u64,
            message: self
                .is_circuit_open()
                .await
                .then(|| "circuit breaker is open".to_string()),
            checked_at: Utc::now(),
        }
    }
}
