//! Durable package registry.
//!
//! The full set of package records lives in one JSON document, loaded into
//! memory at startup and rewritten whole on every mutation. The rewrite is
//! atomic: the document is serialized to a sibling temp file, synced, then
//! renamed over the real path, so a crash mid-write never leaves a torn file.
//!
//! There is no partial write and no transaction log. Mutating API flows are
//! expected to serialize on [`RegistryStore::begin_mutation`] for their whole
//! read-decide-write span; the store itself only guards individual calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Channel, PackageRecord};

/// The persisted registry document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Cumulative upload counter, never decremented.
    #[serde(default)]
    pub total_uploads: u64,
}

/// Owner of the registry document and its persistence.
pub struct RegistryStore {
    path: PathBuf,
    doc: RwLock<RegistryDocument>,
    mutation: Mutex<()>,
}

impl RegistryStore {
    /// Load the registry from disk. A missing file yields an empty registry;
    /// an unparsable one is a startup error rather than silent data loss.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => RegistryDocument::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            doc: RwLock::new(doc),
            mutation: Mutex::new(()),
        })
    }

    /// Acquire the serialized-mutation guard. Compound flows (upload,
    /// download-count bump, delete, retention) hold this across their whole
    /// read-decide-write span so no two mutating operations interleave.
    pub async fn begin_mutation(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().await
    }

    pub async fn get(&self, id: Uuid) -> Option<PackageRecord> {
        let doc = self.doc.read().await;
        doc.packages.iter().find(|r| r.id == id).cloned()
    }

    /// List records, optionally filtered by channel and active flag.
    /// Returned in insertion (upload) order.
    pub async fn list(&self, channel: Option<Channel>, active_only: bool) -> Vec<PackageRecord> {
        let doc = self.doc.read().await;
        doc.packages
            .iter()
            .filter(|r| channel.map_or(true, |c| r.channel == c))
            .filter(|r| !active_only || r.is_active)
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<PackageRecord> {
        self.doc.read().await.packages.clone()
    }

    /// Full point-in-time copy of the document, for stats and maintenance.
    pub async fn snapshot(&self) -> RegistryDocument {
        self.doc.read().await.clone()
    }

    /// Insert a new record or replace an existing one by id, then persist.
    /// New records bump the cumulative upload counter.
    pub async fn upsert(&self, record: PackageRecord) -> Result<()> {
        let mut doc = self.doc.write().await;
        match doc.packages.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => {
                doc.packages.push(record);
                doc.total_uploads += 1;
            }
        }
        doc.last_updated = Some(Utc::now());
        self.persist(&doc).await
    }

    /// Remove a record by id, then persist. Returns whether it was present.
    pub async fn remove(&self, id: Uuid) -> Result<bool> {
        let mut doc = self.doc.write().await;
        let before = doc.packages.len();
        doc.packages.retain(|r| r.id != id);
        if doc.packages.len() == before {
            return Ok(false);
        }
        doc.last_updated = Some(Utc::now());
        self.persist(&doc).await?;
        Ok(true)
    }

    /// Atomic replace-on-disk: write to a temp sibling, sync, rename.
    async fn persist(&self, doc: &RegistryDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(version: &str, channel: Channel, active: bool) -> PackageRecord {
        PackageRecord {
            id: Uuid::new_v4(),
            stored_filename: format!("pkg-v{}.apk", version),
            original_filename: "app.apk".to_string(),
            version: version.to_string(),
            channel,
            uploaded_at: Utc::now(),
            size_bytes: 42,
            checksum_sha256: "0".repeat(64),
            description: String::new(),
            download_count: 0,
            is_active: active,
            deleted_at: None,
            archived_at: None,
        }
    }

    #[tokio::test]
    async fn test_open_missing_file_yields_empty_registry() {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::open(dir.path().join("registry.json"))
            .await
            .unwrap();
        assert!(store.all().await.is_empty());
        assert_eq!(store.snapshot().await.total_uploads, 0);
    }

    #[tokio::test]
    async fn test_upsert_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");

        let store = RegistryStore::open(&path).await.unwrap();
        let rec = record("1.0.0", Channel::Release, true);
        let id = rec.id;
        store.upsert(rec).await.unwrap();

        // Reload from disk
        let reloaded = RegistryStore::open(&path).await.unwrap();
        let fetched = reloaded.get(id).await.unwrap();
        assert_eq!(fetched.version, "1.0.0");
        assert_eq!(reloaded.snapshot().await.total_uploads, 1);

        // No temp file left behind
        assert!(!dir.path().join("registry.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id_without_counting_again() {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::open(dir.path().join("registry.json"))
            .await
            .unwrap();

        let mut rec = record("1.0.0", Channel::Release, true);
        store.upsert(rec.clone()).await.unwrap();
        rec.download_count = 5;
        store.upsert(rec.clone()).await.unwrap();

        assert_eq!(store.all().await.len(), 1);
        assert_eq!(store.get(rec.id).await.unwrap().download_count, 5);
        assert_eq!(store.snapshot().await.total_uploads, 1);
    }

    #[tokio::test]
    async fn test_list_filters_channel_and_active() {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::open(dir.path().join("registry.json"))
            .await
            .unwrap();

        store
            .upsert(record("1.0.0", Channel::Release, true))
            .await
            .unwrap();
        store
            .upsert(record("1.1.0", Channel::Release, false))
            .await
            .unwrap();
        store
            .upsert(record("0.1.0", Channel::Beta, true))
            .await
            .unwrap();

        assert_eq!(store.list(None, false).await.len(), 3);
        assert_eq!(store.list(None, true).await.len(), 2);
        assert_eq!(store.list(Some(Channel::Release), true).await.len(), 1);
        assert_eq!(store.list(Some(Channel::Release), false).await.len(), 2);
        assert_eq!(store.list(Some(Channel::Archive), false).await.len(), 0);
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::open(dir.path().join("registry.json"))
            .await
            .unwrap();

        let rec = record("1.0.0", Channel::Release, true);
        let id = rec.id;
        store.upsert(rec).await.unwrap();

        assert!(store.remove(id).await.unwrap());
        assert!(store.get(id).await.is_none());
        assert!(!store.remove(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        assert!(RegistryStore::open(&path).await.is_err());
    }
}
