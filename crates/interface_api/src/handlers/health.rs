//! Health and readiness handlers
//!
//! `/health` answers as long as the process is up. `/health/ready` probes
//! the dependencies a request actually needs and reports each one, so an
//! orchestrator can pull the instance out of rotation before requests fail.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: Vec<ComponentCheck>,
}

#[derive(Serialize)]
pub struct ComponentCheck {
    pub component: &'static str,
    pub healthy: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe with per-component results
///
/// Returns 503 with the failing component named when any check fails.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let checks = vec![check_database(&state).await];

    if checks.iter().all(|c| c.healthy) {
        Ok(Json(ReadinessResponse {
            status: "ready",
            checks,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                checks,
            }),
        ))
    }
}

async fn check_database(state: &AppState) -> ComponentCheck {
    let started = Instant::now();
    let result = sqlx::query("SELECT 1").execute(&state.pool).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(_) => ComponentCheck {
            component: "database",
            healthy: true,
            latency_ms,
            detail: None,
        },
        Err(e) => ComponentCheck {
            component: "database",
            healthy: false,
            latency_ms,
            detail: Some(e.to_string()),
        },
    }
}
