//! Health check endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::api::SharedState;
use crate::models::Channel;

#[derive(OpenApi)]
#[openapi(
    paths(health_check, readiness_check),
    components(schemas(HealthResponse, HealthChecks, CheckStatus))
)]
pub struct HealthApiDoc;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize, ToSchema)]
pub struct HealthChecks {
    pub registry: CheckStatus,
    pub storage: CheckStatus,
}

#[derive(Serialize, ToSchema)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check endpoint - reports registry and storage status
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    operation_id = "health_check",
    responses((status = 200, description = "Health report", body = HealthResponse)),
)]
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let package_count = state.registry.all().await.len();
    let registry_check = CheckStatus {
        status: "healthy".to_string(),
        message: Some(format!("{} packages", package_count)),
    };

    let mut missing = Vec::new();
    for channel in Channel::ALL {
        let dir = state.storage.partition_dir(channel);
        if !dir.is_dir() {
            missing.push(channel.to_string());
        }
    }
    let storage_check = if missing.is_empty() {
        CheckStatus {
            status: "healthy".to_string(),
            message: None,
        }
    } else {
        CheckStatus {
            status: "unhealthy".to_string(),
            message: Some(format!("missing partitions: {}", missing.join(", "))),
        }
    };

    let status = if storage_check.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            registry: registry_check,
            storage: storage_check,
        },
    })
}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    operation_id = "readiness_check",
    responses((status = 200, description = "Service is ready")),
)]
pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, "ready")
}
