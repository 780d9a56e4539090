//! PostgreSQL auth adapter
//!
//! Implements [`AuthPort`] against the identity tables. `is_admin` always
//! reads the user row; the flag is never cached, so a role revoked out of
//! band takes effect on the caller's next privileged operation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, AuthPort, DomainPort, HealthCheckResult, HealthCheckable, PortError, Session,
    UserId, UserIdentity,
};

use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of [`AuthPort`]
#[derive(Debug, Clone)]
pub struct PgAuthAdapter {
    pool: PgPool,
}

impl PgAuthAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    is_admin: bool,
}

impl From<UserRow> for UserIdentity {
    fn from(row: UserRow) -> Self {
        UserIdentity {
            id: UserId::from(row.id),
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

impl DomainPort for PgAuthAdapter {}

#[async_trait]
impl AuthPort for PgAuthAdapter {
    async fn get_user(&self, user_id: UserId) -> Result<Option<UserIdentity>, PortError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, is_admin FROM users WHERE id = $1")
                .bind(*user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::from)?;

        Ok(row.map(UserIdentity::from))
    }

    async fn verify_session(&self, session: &Session) -> Result<bool, PortError> {
        if session.is_expired() {
            return Ok(false);
        }

        let exists: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM sessions \
             WHERE user_id = $1 AND token_hash = digest($2, 'sha256') AND expires_at > now()",
        )
        .bind(*session.user_id.as_uuid())
        .bind(&session.bearer_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(exists.is_some())
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, PortError> {
        let is_admin: Option<bool> =
            sqlx::query_scalar("SELECT is_admin FROM users WHERE id = $1")
                .bind(*user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::from)?;

        Ok(is_admin.unwrap_or(false))
    }
}

#[async_trait]
impl HealthCheckable for PgAuthAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: "pg-auth".to_string(),
            status,
            latency_ms: start.elapsed().as_millis() as u64,
            message,
            checked_at: Utc::now(),
        }
    }
}
