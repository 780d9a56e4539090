//! Privileged auth provider client
//!
//! HTTP adapter for [`PrivilegedAuth`] against the auth provider's admin
//! API, authenticated with the service-role key. Constructed once at
//! startup and passed into the operations that need it; nothing else in
//! the process holds the key.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError, PrivilegedAuth, SignedUrl, UserId, UserIdentity};

/// Admin API client holding the service-role key
pub struct HttpPrivilegedAuth {
    client: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

#[derive(Debug, Serialize)]
struct CreateIdentityBody<'a> {
    email: &'a str,
    email_confirm: bool,
}

#[derive(Debug, Deserialize)]
struct IdentityBody {
    id: UserId,
    email: String,
}

#[derive(Debug, Serialize)]
struct SignUrlBody<'a> {
    path: &'a str,
    expires_in_secs: i64,
}

#[derive(Debug, Deserialize)]
struct SignedUrlBody {
    url: String,
}

impl HttpPrivilegedAuth {
    pub fn new(base_url: String, service_role_key: String) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(10))
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            service_role_key,
        })
    }

    fn map_status(status: StatusCode, context: &str) -> PortError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
                message: format!("{context}: service-role key rejected"),
            },
            StatusCode::NOT_FOUND => PortError::NotFound {
                entity_type: "storage object".to_string(),
                id: context.to_string(),
            },
            StatusCode::CONFLICT => PortError::Conflict {
                message: format!("{context}: identity already exists"),
            },
            s if s.is_server_error() => PortError::ServiceUnavailable {
                service: "auth provider".to_string(),
            },
            s => PortError::Internal {
                message: format!("{context}: unexpected status {s}"),
                source: None,
            },
        }
    }

    fn map_transport(err: reqwest::Error) -> PortError {
        if err.is_timeout() {
            PortError::Timeout {
                operation: "auth admin call".to_string(),
                duration_ms: 10_000,
            }
        } else {
            PortError::Connection {
                message: err.to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}

impl DomainPort for HttpPrivilegedAuth {}

#[async_trait]
impl PrivilegedAuth for HttpPrivilegedAuth {
    async fn create_identity(&self, email: &str) -> Result<UserIdentity, PortError> {
        let response = self
            .client
            .post(format!("{}/admin/identities", self.base_url))
            .bearer_auth(&self.service_role_key)
            .json(&CreateIdentityBody {
                email,
                email_confirm: true,
            })
            .send()
            .await
            .map_err(Self::map_transport)?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status(), "create identity"));
        }

        let body: IdentityBody = response.json().await.map_err(|e| PortError::Internal {
            message: "malformed identity response".to_string(),
            source: Some(Box::new(e)),
        })?;

        Ok(UserIdentity {
            id: body.id,
            email: body.email,
            is_admin: false,
        })
    }

    async fn sign_document_url(
        &self,
        storage_path: &str,
        expires_in: Duration,
    ) -> Result<SignedUrl, PortError> {
        let response = self
            .client
            .post(format!("{}/storage/sign", self.base_url))
            .bearer_auth(&self.service_role_key)
            .json(&SignUrlBody {
                path: storage_path,
                expires_in_secs: expires_in.num_seconds(),
            })
            .send()
            .await
            .map_err(Self::map_transport)?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status(), storage_path));
        }

        let body: SignedUrlBody = response.json().await.map_err(|e| PortError::Internal {
            message: "malformed signed URL response".to_string(),
            source: Some(Box::new(e)),
        })?;

        Ok(SignedUrl {
            url: body.url,
            expires_at: Utc::now() + expires_in,
        })
    }
}
