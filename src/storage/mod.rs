//! Channel storage layout.
//!
//! Each channel maps to its own partition directory under the storage root.
//! Stored filenames derive from identifier + version, never from user input,
//! so distinct uploads can never collide on disk.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Channel;

/// Filesystem layout for channel partitions.
pub struct ChannelStorage {
    root: PathBuf,
}

impl ChannelStorage {
    /// Create the storage layout, ensuring every partition directory exists.
    pub async fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for channel in Channel::ALL {
            fs::create_dir_all(root.join(channel.partition())).await?;
        }
        Ok(Self { root })
    }

    /// Derive the stored filename for an upload.
    pub fn stored_filename(id: Uuid, version: &str) -> String {
        format!("{}-v{}.apk", id, sanitize_version(version))
    }

    /// Partition directory for a channel.
    pub fn partition_dir(&self, channel: Channel) -> PathBuf {
        self.root.join(channel.partition())
    }

    fn path_for(&self, channel: Channel, stored_filename: &str) -> PathBuf {
        self.partition_dir(channel).join(stored_filename)
    }

    /// Write a package file into its channel partition. Refuses to overwrite:
    /// identifier-derived names make a collision a bookkeeping bug, not a
    /// normal condition.
    pub async fn write(&self, channel: Channel, stored_filename: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(channel, stored_filename);
        if fs::try_exists(&path).await? {
            return Err(AppError::Storage(format!(
                "refusing to overwrite existing file {}",
                path.display()
            )));
        }
        write_synced(&path, data).await?;
        Ok(())
    }

    /// Read a package file. `Ok(None)` when the registry points at a file
    /// that is no longer on disk.
    pub async fn read(&self, channel: Channel, stored_filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(channel, stored_filename);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub async fn exists(&self, channel: Channel, stored_filename: &str) -> Result<bool> {
        Ok(fs::try_exists(self.path_for(channel, stored_filename)).await?)
    }

    /// Delete a package file. Idempotent: an already-absent file is treated
    /// as success, but the anomaly is logged. Returns whether a file was
    /// actually removed.
    pub async fn delete(&self, channel: Channel, stored_filename: &str) -> Result<bool> {
        let path = self.path_for(channel, stored_filename);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "file already absent on delete");
                Ok(false)
            }
            Err(e) => Err(AppError::Storage(format!(
                "failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Move a package file from a source channel into the archive partition.
    ///
    /// Copy-then-delete, with the destination synced before the source is
    /// removed: an interruption leaves at least one valid copy, preferring
    /// the source. A missing source is an error; the caller decides whether
    /// to skip the record or abort.
    pub async fn move_to_archive(&self, from: Channel, stored_filename: &str) -> Result<()> {
        let src = self.path_for(from, stored_filename);
        let dst = self.path_for(Channel::Archive, stored_filename);

        let data = fs::read(&src).await.map_err(|e| {
            AppError::Storage(format!("failed to read {}: {}", src.display(), e))
        })?;
        write_synced(&dst, &data).await?;
        fs::remove_file(&src).await.map_err(|e| {
            AppError::Storage(format!("failed to remove {}: {}", src.display(), e))
        })?;
        Ok(())
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

/// Keep version strings path-safe in filenames.
fn sanitize_version(version: &str) -> String {
    version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
