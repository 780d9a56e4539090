//! HTTP client for the trusted payout functions
//!
//! The trusted functions run server-side with service credentials and are
//! the only code allowed to write payout rows directly. This client invokes
//! them over HTTPS, forwarding the caller's bearer token untouched so the
//! function verifies the session itself.
//!
//! Response mapping:
//! - 2xx with a receipt body -> `ExecutorReceipt`
//! - 4xx with a message body -> `ExecutorError::Rejected` (verbatim message)
//! - 401/403               -> `ExecutorError::Invocation(Unauthorized)`
//! - timeouts, connect errors, 5xx -> `ExecutorError::Invocation` with a
//!   transient `PortError`; the outcome of the call is unknown

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use core_kernel::{BankAccountId, DomainPort, Money, PayoutId, PortError};

use crate::executor::{ExecutorError, ExecutorReceipt, PayoutExecutor};
use crate::payout::PayoutStatus;

/// Configuration for the trusted function client
#[derive(Debug, Clone)]
pub struct TrustedFunctionConfig {
    /// Base URL of the function host (e.g. "https://fns.platform.example")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TrustedFunctionConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 15,
        }
    }
}

/// Production implementation of [`PayoutExecutor`]
#[derive(Debug)]
pub struct TrustedFunctionClient {
    config: TrustedFunctionConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct RequestPayoutBody {
    amount: rust_decimal::Decimal,
    currency: String,
    bank_account_id: BankAccountId,
}

#[derive(Debug, Serialize)]
struct ApprovePayoutBody {
    payout_id: PayoutId,
}

#[derive(Debug, Deserialize)]
struct ReceiptBody {
    payout_id: PayoutId,
    status: PayoutStatus,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefusalBody {
    message: String,
}

impl TrustedFunctionClient {
    pub fn new(config: TrustedFunctionConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn invoke<B: Serialize>(
        &self,
        function: &str,
        body: &B,
        bearer_token: &str,
    ) -> Result<ExecutorReceipt, ExecutorError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), function);

        let response = self
            .client
            .post(&url)
            .bearer_auth(bearer_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ExecutorError::Invocation(map_transport_error(function, e)))?;

        let status = response.status();
        if status.is_success() {
            let receipt: ReceiptBody = response.json().await.map_err(|e| {
                ExecutorError::Invocation(PortError::Internal {
                    message: format!("malformed receipt from {function}"),
                    source: Some(Box::new(e)),
                })
            })?;
            return Ok(ExecutorReceipt {
                payout_id: receipt.payout_id,
                status: receipt.status,
                message: receipt.message,
            });
        }

        match status.as_u16() {
            401 | 403 => Err(ExecutorError::Invocation(PortError::unauthorized(
                format!("{function} refused the caller's token"),
            ))),
            429 => Err(ExecutorError::Invocation(PortError::RateLimited {
                retry_after_secs: retry_after(&response),
            })),
            code if (500..600).contains(&code) => {
                warn!(function, code, "trusted function returned a server error");
                Err(ExecutorError::Invocation(PortError::ServiceUnavailable {
                    service: function.to_string(),
                }))
            }
            _ => {
                // A structured business refusal; keep the message verbatim
                let message = match response.json::<RefusalBody>().await {
                    Ok(body) => body.message,
                    Err(_) => format!("{function} refused the request"),
                };
                Err(ExecutorError::rejected(message))
            }
        }
    }
}

fn retry_after(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(60)
}

fn map_transport_error(function: &str, error: reqwest::Error) -> PortError {
    if error.is_timeout() {
        PortError::Timeout {
            operation: function.to_string(),
            duration_ms: 0,
        }
    } else {
        PortError::Connection {
            message: format!("invocation of {function} failed"),
            source: Some(Box::new(error)),
        }
    }
}

impl DomainPort for TrustedFunctionClient {}

#[async_trait]
impl PayoutExecutor for TrustedFunctionClient {
    async fn request_payout(
        &self,
        amount: Money,
        bank_account_id: BankAccountId,
        bearer_token: &str,
    ) -> Result<ExecutorReceipt, ExecutorError> {
        let body = RequestPayoutBody {
            amount: amount.amount(),
            currency: amount.currency().code().to_string(),
            bank_account_id,
        };
        self.invoke("request-payout", &body, bearer_token).await
    }

    async fn approve_payout(
        &self,
        payout_id: PayoutId,
        bearer_token: &str,
    ) -> Result<ExecutorReceipt, ExecutorError> {
        let body = ApprovePayoutBody { payout_id };
        self.invoke("approve-payout", &body, bearer_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client = TrustedFunctionClient::new(TrustedFunctionConfig {
            base_url: "https://fns.platform.example/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.base_url(), "https://fns.platform.example/");
    }

    #[test]
    fn test_config_default_timeout() {
        assert_eq!(TrustedFunctionConfig::default().timeout_secs, 15);
    }

    #[test]
    fn test_receipt_body_deserializes() {
        let json = r#"{"payout_id":"8f9f6f5e-13a1-7c2e-9d4b-111213141516","status":"requested","message":null}"#;
        let body: ReceiptBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.status, PayoutStatus::Requested);
        assert!(body.message.is_none());
    }

    #[test]
    fn test_refusal_body_keeps_message() {
        let json = r#"{"message":"Insufficient balance"}"#;
        let body: RefusalBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.message, "Insufficient balance");
    }
}
