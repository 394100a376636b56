//! Maintenance handlers: retention cleanup and archiving.
//!
//! Both operations run synchronously in the request and report per-record
//! failures in the response body rather than aborting the batch.

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::api::SharedState;
use crate::error::{AppError, Result};

#[derive(OpenApi)]
#[openapi(
    paths(run_cleanup, run_archive),
    components(schemas(CleanupResponse, ArchiveResponse))
)]
pub struct MaintenanceApiDoc;

/// Create maintenance routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/cleanup", post(run_cleanup))
        .route("/archive", post(run_archive))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CleanupQuery {
    /// Age threshold in days (default: 30, minimum: 1)
    pub days_old: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResponse {
    pub message: String,
    pub files_cleaned: u64,
    pub days_old_threshold: u32,
    pub errors: Vec<String>,
}

/// POST /apk/cleanup
///
/// Physically removes inactive packages older than the threshold.
#[utoipa::path(
    post,
    path = "/cleanup",
    context_path = "/apk",
    tag = "maintenance",
    operation_id = "run_cleanup",
    params(CleanupQuery),
    responses(
        (status = 200, description = "Cleanup result", body = CleanupResponse),
        (status = 400, description = "days_old below 1"),
    ),
)]
pub async fn run_cleanup(
    State(state): State<SharedState>,
    Query(query): Query<CleanupQuery>,
) -> Result<Json<CleanupResponse>> {
    let days_old = query.days_old.unwrap_or(30);
    if days_old < 1 {
        return Err(AppError::Validation(
            "days_old must be at least 1".to_string(),
        ));
    }

    let outcome = state.retention_service().cleanup(days_old).await?;

    Ok(Json(CleanupResponse {
        message: "cleanup completed".to_string(),
        files_cleaned: outcome.cleaned,
        days_old_threshold: days_old,
        errors: outcome.errors,
    }))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ArchiveQuery {
    /// Versions to keep per channel (default: 3, minimum: 1)
    pub keep_versions: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArchiveResponse {
    pub message: String,
    pub versions_archived: u64,
    pub versions_kept_per_channel: usize,
    pub errors: Vec<String>,
}

/// POST /apk/archive
///
/// Moves all but the highest `keep_versions` active versions per source
/// channel into the archive channel. Archived packages stay downloadable.
#[utoipa::path(
    post,
    path = "/archive",
    context_path = "/apk",
    tag = "maintenance",
    operation_id = "run_archive",
    params(ArchiveQuery),
    responses(
        (status = 200, description = "Archive result", body = ArchiveResponse),
        (status = 400, description = "keep_versions below 1"),
    ),
)]
pub async fn run_archive(
    State(state): State<SharedState>,
    Query(query): Query<ArchiveQuery>,
) -> Result<Json<ArchiveResponse>> {
    let keep_versions = query.keep_versions.unwrap_or(3);
    if keep_versions < 1 {
        return Err(AppError::Validation(
            "keep_versions must be at least 1".to_string(),
        ));
    }

    let outcome = state.retention_service().archive(keep_versions).await?;

    Ok(Json(ArchiveResponse {
        message: "archiving completed".to_string(),
        versions_archived: outcome.archived,
        versions_kept_per_channel: keep_versions,
        errors: outcome.errors,
    }))
}
