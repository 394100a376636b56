//! Shared Data Transfer Objects for API handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Channel, PackageRecord};

/// Package record as exposed over the API. Physical storage locations are
/// never included; the stored filename is only a name within its partition.
#[derive(Debug, Serialize, ToSchema)]
pub struct PackageSummary {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub version: String,
    pub channel: Channel,
    pub uploaded_at: DateTime<Utc>,
    pub size_bytes: i64,
    pub checksum_sha256: String,
    pub description: String,
    pub download_count: i64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    pub download_url: String,
}

impl From<PackageRecord> for PackageSummary {
    fn from(record: PackageRecord) -> Self {
        let download_url = format!("/apk/download/{}", record.id);
        Self {
            id: record.id,
            filename: record.stored_filename,
            original_filename: record.original_filename,
            version: record.version,
            channel: record.channel,
            uploaded_at: record.uploaded_at,
            size_bytes: record.size_bytes,
            checksum_sha256: record.checksum_sha256,
            description: record.description,
            download_count: record.download_count,
            is_active: record.is_active,
            deleted_at: record.deleted_at,
            archived_at: record.archived_at,
            download_url,
        }
    }
}
