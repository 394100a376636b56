//! Package handlers: upload, discovery, download, and soft delete.

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::api::dto::PackageSummary;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::Channel;
use crate::services::package_service::UploadRequest;
use crate::services::stats_service::{self, ChannelCounts, StorageStats};
use crate::validation::PACKAGE_CONTENT_TYPE;

/// Per-route buffering bound for uploads. The configured size ceiling is
/// enforced by the validation gate; this only stops unbounded bodies.
const UPLOAD_BODY_LIMIT: usize = 256 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_package,
        list_packages,
        download_package,
        latest_package,
        package_info,
        delete_package,
        package_stats
    ),
    components(schemas(
        PackageSummary,
        Channel,
        UploadResponse,
        ListResponse,
        DeleteResponse,
        StorageStats,
        ChannelCounts
    ))
)]
pub struct PackagesApiDoc;

/// Create package routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/upload",
            post(upload_package).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/list", get(list_packages))
        .route("/download/:id", get(download_package))
        .route("/latest", get(latest_package))
        .route("/info/:id", get(package_info))
        .route("/delete/:id", delete(delete_package))
        .route("/stats", get(package_stats))
}

fn parse_channel(raw: Option<&str>) -> Result<Option<Channel>> {
    match raw {
        None => Ok(None),
        Some(name) => Channel::parse(name).map(Some).ok_or_else(|| {
            AppError::Validation(format!(
                "invalid channel '{}'; must be 'release', 'beta', or 'archive'",
                name
            ))
        }),
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Explicit version; auto-assigned from the channel's highest active
    /// version when omitted.
    pub version: Option<String>,
    /// Target channel (default: release)
    pub channel: Option<String>,
    /// Free-text description
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub id: Uuid,
    pub version: String,
    pub channel: Channel,
    pub size_bytes: i64,
    pub download_url: String,
}

/// POST /apk/upload
///
/// Multipart upload; the package bytes come in a `file` field. Version,
/// channel, and description ride in the query string.
#[utoipa::path(
    post,
    path = "/upload",
    context_path = "/apk",
    tag = "packages",
    operation_id = "upload_package",
    params(UploadQuery),
    responses(
        (status = 200, description = "Package uploaded", body = UploadResponse),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Version or content conflict"),
    ),
)]
pub async fn upload_package(
    State(state): State<SharedState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let channel = parse_channel(query.channel.as_deref())?.unwrap_or(Channel::Release);

    let mut file: Option<(String, Option<String>, bytes::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("failed to read file field: {}", e)))?;
            file = Some((filename, content_type, data));
        }
    }

    let (original_filename, declared_content_type, data) =
        file.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    if original_filename.is_empty() {
        return Err(AppError::Validation(
            "uploaded file has no filename".to_string(),
        ));
    }

    let record = state
        .package_service()
        .upload(UploadRequest {
            original_filename,
            declared_content_type,
            data,
            version: query.version,
            channel,
            description: query.description.unwrap_or_default(),
        })
        .await?;

    Ok(Json(UploadResponse {
        message: "package uploaded successfully".to_string(),
        id: record.id,
        version: record.version,
        channel: record.channel,
        size_bytes: record.size_bytes,
        download_url: format!("/apk/download/{}", record.id),
    }))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Restrict to one channel
    pub channel: Option<String>,
    /// Only active records (default: true)
    pub active_only: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    pub packages: Vec<PackageSummary>,
    pub total_count: usize,
    /// Channels present in the returned set
    pub channels: Vec<String>,
}

/// GET /apk/list
#[utoipa::path(
    get,
    path = "/list",
    context_path = "/apk",
    tag = "packages",
    operation_id = "list_packages",
    params(ListQuery),
    responses(
        (status = 200, description = "Package listing, newest first", body = ListResponse),
        (status = 400, description = "Invalid channel"),
    ),
)]
pub async fn list_packages(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let channel = parse_channel(query.channel.as_deref())?;
    let active_only = query.active_only.unwrap_or(true);

    let records = state.package_service().list(channel, active_only).await;
    let channels: BTreeSet<String> = records.iter().map(|r| r.channel.to_string()).collect();
    let packages: Vec<PackageSummary> = records.into_iter().map(PackageSummary::from).collect();

    Ok(Json(ListResponse {
        total_count: packages.len(),
        channels: channels.into_iter().collect(),
        packages,
    }))
}

/// GET /apk/download/:id
///
/// Streams the package bytes and bumps the record's download counter.
#[utoipa::path(
    get,
    path = "/download/{id}",
    context_path = "/apk",
    tag = "packages",
    operation_id = "download_package",
    params(("id" = Uuid, Path, description = "Package identifier")),
    responses(
        (status = 200, description = "Package byte stream"),
        (status = 404, description = "Unknown identifier or file missing on disk"),
        (status = 410, description = "Package is soft-deleted"),
    ),
)]
pub async fn download_package(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let (record, data) = state.package_service().download(id).await?;

    // Stored filenames only contain [A-Za-z0-9._-], safe for the header
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PACKAGE_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.stored_filename),
        )
        .body(Body::from(data))
        .unwrap();
    Ok(response)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LatestQuery {
    /// Channel to inspect (default: release)
    pub channel: Option<String>,
}

/// GET /apk/latest
#[utoipa::path(
    get,
    path = "/latest",
    context_path = "/apk",
    tag = "packages",
    operation_id = "latest_package",
    params(LatestQuery),
    responses(
        (status = 200, description = "Latest active package in the channel", body = PackageSummary),
        (status = 404, description = "No active packages in the channel"),
    ),
)]
pub async fn latest_package(
    State(state): State<SharedState>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<PackageSummary>> {
    let channel = parse_channel(query.channel.as_deref())?.unwrap_or(Channel::Release);
    let record = state.package_service().latest(channel).await?;
    Ok(Json(PackageSummary::from(record)))
}

/// GET /apk/info/:id
#[utoipa::path(
    get,
    path = "/info/{id}",
    context_path = "/apk",
    tag = "packages",
    operation_id = "package_info",
    params(("id" = Uuid, Path, description = "Package identifier")),
    responses(
        (status = 200, description = "Package detail", body = PackageSummary),
        (status = 404, description = "Unknown identifier"),
    ),
)]
pub async fn package_info(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PackageSummary>> {
    let record = state.package_service().info(id).await?;
    Ok(Json(PackageSummary::from(record)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub id: Uuid,
}

/// DELETE /apk/delete/:id
///
/// Soft delete: the record turns inactive and its file stays on disk until a
/// cleanup run removes it.
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    context_path = "/apk",
    tag = "packages",
    operation_id = "delete_package",
    params(("id" = Uuid, Path, description = "Package identifier")),
    responses(
        (status = 200, description = "Package marked inactive", body = DeleteResponse),
        (status = 404, description = "Unknown identifier"),
    ),
)]
pub async fn delete_package(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let record = state.package_service().delete(id).await?;
    Ok(Json(DeleteResponse {
        message: "package marked as inactive".to_string(),
        id: record.id,
    }))
}

/// GET /apk/stats
#[utoipa::path(
    get,
    path = "/stats",
    context_path = "/apk",
    tag = "packages",
    operation_id = "package_stats",
    responses(
        (status = 200, description = "Aggregate storage statistics", body = StorageStats),
    ),
)]
pub async fn package_stats(State(state): State<SharedState>) -> Result<Json<StorageStats>> {
    let snapshot = state.registry.snapshot().await;
    Ok(Json(stats_service::aggregate(
        &snapshot.packages,
        snapshot.total_uploads,
    )))
}
