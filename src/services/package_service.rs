//! Package service.
//!
//! Orchestrates the upload pipeline (validation, dedup, version resolution,
//! storage write, registry append) and the per-record read and lifecycle
//! operations behind the HTTP surface.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::digest;
use crate::error::{AppError, Result};
use crate::models::{Channel, PackageRecord};
use crate::registry::RegistryStore;
use crate::storage::ChannelStorage;
use crate::validation;
use crate::version::{self, VersionKey};

/// Upload request as assembled by the handler.
#[derive(Debug)]
pub struct UploadRequest {
    pub original_filename: String,
    pub declared_content_type: Option<String>,
    pub data: Bytes,
    pub version: Option<String>,
    pub channel: Channel,
    pub description: String,
}

/// Package service
pub struct PackageService {
    registry: Arc<RegistryStore>,
    storage: Arc<ChannelStorage>,
    max_upload_size_bytes: u64,
}

impl PackageService {
    pub fn new(
        registry: Arc<RegistryStore>,
        storage: Arc<ChannelStorage>,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            registry,
            storage,
            max_upload_size_bytes,
        }
    }

    /// Upload a package.
    ///
    /// On any failure nothing is persisted: validation and conflict checks run
    /// before the storage write, and a failed registry append rolls the file
    /// back out of the partition.
    pub async fn upload(&self, req: UploadRequest) -> Result<PackageRecord> {
        validation::validate_upload(
            &req.original_filename,
            req.declared_content_type.as_deref(),
            req.data.len() as u64,
            self.max_upload_size_bytes,
        )?;

        let checksum_sha256 = digest::sha256_hex(&req.data);

        let _guard = self.registry.begin_mutation().await;

        let active = self.registry.list(Some(req.channel), true).await;
        if active.iter().any(|r| r.checksum_sha256 == checksum_sha256) {
            return Err(AppError::Conflict(format!(
                "package with identical content already exists in {} channel",
                req.channel
            )));
        }

        let assigned_version = version::resolve(req.channel, req.version.as_deref(), &active)?;

        let id = Uuid::new_v4();
        let stored_filename = ChannelStorage::stored_filename(id, &assigned_version);
        self.storage
            .write(req.channel, &stored_filename, &req.data)
            .await?;

        let record = PackageRecord {
            id,
            stored_filename: stored_filename.clone(),
            original_filename: req.original_filename,
            version: assigned_version,
            channel: req.channel,
            uploaded_at: Utc::now(),
            size_bytes: req.data.len() as i64,
            checksum_sha256,
            description: req.description,
            download_count: 0,
            is_active: true,
            deleted_at: None,
            archived_at: None,
        };

        if let Err(e) = self.registry.upsert(record.clone()).await {
            // Failed registry append must not strand the file on disk
            let _ = self.storage.delete(req.channel, &stored_filename).await;
            return Err(e);
        }

        tracing::info!(
            id = %record.id,
            version = %record.version,
            channel = %record.channel,
            size_bytes = record.size_bytes,
            "package uploaded"
        );
        Ok(record)
    }

    /// Download a package, bumping its download counter.
    pub async fn download(&self, id: Uuid) -> Result<(PackageRecord, Bytes)> {
        let _guard = self.registry.begin_mutation().await;

        let mut record = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound("package not found".to_string()))?;

        if !record.is_active {
            return Err(AppError::Gone(
                "package is no longer available".to_string(),
            ));
        }

        let data = self
            .storage
            .read(record.channel, &record.stored_filename)
            .await?
            .ok_or_else(|| AppError::NotFound("package file not found on disk".to_string()))?;

        record.download_count += 1;
        self.registry.upsert(record.clone()).await?;

        Ok((record, Bytes::from(data)))
    }

    /// Get a record by id.
    pub async fn info(&self, id: Uuid) -> Result<PackageRecord> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound("package not found".to_string()))
    }

    /// Latest active record in a channel: highest version by the registry's
    /// version ordering, ties broken by newest upload.
    pub async fn latest(&self, channel: Channel) -> Result<PackageRecord> {
        self.registry
            .list(Some(channel), true)
            .await
            .into_iter()
            .max_by(|a, b| {
                VersionKey::parse(&a.version)
                    .cmp(&VersionKey::parse(&b.version))
                    .then(a.uploaded_at.cmp(&b.uploaded_at))
            })
            .ok_or_else(|| {
                AppError::NotFound(format!("no packages found in {} channel", channel))
            })
    }

    /// List records, newest upload first.
    pub async fn list(&self, channel: Option<Channel>, active_only: bool) -> Vec<PackageRecord> {
        let mut records = self.registry.list(channel, active_only).await;
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        records
    }

    /// Soft-delete: mark inactive, keep the file until cleanup.
    pub async fn delete(&self, id: Uuid) -> Result<PackageRecord> {
        let _guard = self.registry.begin_mutation().await;

        let mut record = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound("package not found".to_string()))?;

        record.is_active = false;
        record.deleted_at = Some(Utc::now());
        self.registry.upsert(record.clone()).await?;

        tracing::info!(id = %record.id, version = %record.version, "package soft-deleted");
        Ok(record)
    }
}
