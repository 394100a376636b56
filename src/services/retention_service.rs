//! Retention engine: age-based cleanup and count-based archiving.
//!
//! Both operations work on a snapshot of the registry taken at invocation
//! time and run synchronously to completion. Per-record failures are skipped
//! and reported; a batch is best-effort, not transactional. Records already
//! processed stay changed when a later record fails.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::Channel;
use crate::registry::RegistryStore;
use crate::storage::ChannelStorage;
use crate::version::VersionKey;

/// Outcome of a cleanup run.
#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupOutcome {
    /// Registry entries removed (files deleted or already absent).
    pub cleaned: u64,
    /// Per-record failures, skipped and reported.
    pub errors: Vec<String>,
}

/// Outcome of an archive run.
#[derive(Debug, Serialize, ToSchema)]
pub struct ArchiveOutcome {
    /// Records moved into the archive channel.
    pub archived: u64,
    /// Per-record failures, skipped and reported.
    pub errors: Vec<String>,
}

/// Retention service
pub struct RetentionService {
    registry: Arc<RegistryStore>,
    storage: Arc<ChannelStorage>,
}

impl RetentionService {
    pub fn new(registry: Arc<RegistryStore>, storage: Arc<ChannelStorage>) -> Self {
        Self { registry, storage }
    }

    /// Remove inactive records uploaded strictly before `now - days_old`,
    /// deleting their files and dropping their registry entries. A record
    /// whose file is already gone still leaves the registry and counts as
    /// cleaned.
    pub async fn cleanup(&self, days_old: u32) -> Result<CleanupOutcome> {
        let cutoff = Utc::now() - Duration::days(i64::from(days_old));
        let _guard = self.registry.begin_mutation().await;

        let snapshot = self.registry.all().await;
        let mut cleaned = 0u64;
        let mut errors = Vec::new();

        for record in snapshot {
            if record.is_active || record.uploaded_at >= cutoff {
                continue;
            }

            match self
                .storage
                .delete(record.channel, &record.stored_filename)
                .await
            {
                Ok(_removed) => match self.registry.remove(record.id).await {
                    Ok(_) => {
                        tracing::info!(id = %record.id, version = %record.version, "cleaned up inactive package");
                        cleaned += 1;
                    }
                    Err(e) => errors.push(format!("{}: {}", record.id, e)),
                },
                Err(e) => errors.push(format!("{}: {}", record.id, e)),
            }
        }

        Ok(CleanupOutcome { cleaned, errors })
    }

    /// Per source channel, keep the `keep_versions` highest active versions
    /// in place and move the rest into the archive partition, reassigning
    /// their channel. Archived records stay active and downloadable.
    ///
    /// Idempotent: archived records no longer sit in a source channel, so an
    /// immediate re-run moves nothing.
    pub async fn archive(&self, keep_versions: usize) -> Result<ArchiveOutcome> {
        let _guard = self.registry.begin_mutation().await;

        let mut archived = 0u64;
        let mut errors = Vec::new();

        for channel in Channel::ARCHIVABLE {
            let mut active = self.registry.list(Some(channel), true).await;
            active.sort_by(|a, b| {
                VersionKey::parse(&b.version).cmp(&VersionKey::parse(&a.version))
            });

            for mut record in active.into_iter().skip(keep_versions) {
                match self
                    .storage
                    .move_to_archive(channel, &record.stored_filename)
                    .await
                {
                    Ok(()) => {
                        record.channel = Channel::Archive;
                        record.archived_at = Some(Utc::now());
                        match self.registry.upsert(record.clone()).await {
                            Ok(()) => {
                                tracing::info!(
                                    id = %record.id,
                                    version = %record.version,
                                    from = %channel,
                                    "archived old package version"
                                );
                                archived += 1;
                            }
                            Err(e) => {
                                errors.push(format!("{} v{}: {}", record.id, record.version, e))
                            }
                        }
                    }
                    Err(e) => errors.push(format!("{} v{}: {}", record.id, record.version, e)),
                }
            }
        }

        Ok(ArchiveOutcome { archived, errors })
    }
}
