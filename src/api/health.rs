//! Health probes: `/health`, `/live` and `/ready`

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::warn;

use crate::api::types::Json;
use crate::domain::storage::DocumentQuery;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl HealthResponse {
    fn new(status: HealthStatus) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks: Vec::new(),
            latency_ms: None,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of probing one dependency
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

/// Process is up
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::new(HealthStatus::Healthy)))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

/// 503 until the document store answers a count query
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let storage = probe_storage(&state).await;

    let mut response = HealthResponse::new(storage.status);
    response.checks.push(storage);
    response.latency_ms = Some(start.elapsed().as_millis() as u64);

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

async fn probe_storage(state: &AppState) -> HealthCheck {
    let start = Instant::now();
    let outcome = state.events.count_matching(&DocumentQuery::new()).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(_) => HealthCheck {
            name: "storage",
            status: HealthStatus::Healthy,
            message: None,
            latency_ms,
        },
        Err(e) => {
            warn!(error = %e, "Storage readiness probe failed");
            // Backend details stay in the log
            HealthCheck {
                name: "storage",
                status: HealthStatus::Unhealthy,
                message: Some("storage unreachable".to_string()),
                latency_ms,
            }
        }
    }
}
