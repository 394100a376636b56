//! Storage statistics aggregator.
//!
//! Pure read-only function of a registry snapshot; no side effects.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Channel, PackageRecord};

/// Aggregate storage statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct StorageStats {
    pub total_packages: usize,
    pub active_packages: usize,
    pub inactive_packages: usize,
    /// Sum of byte sizes over all records, active and inactive.
    pub total_size_bytes: i64,
    /// Same total in megabytes, rounded to two decimals.
    pub total_size_mb: f64,
    pub channels: ChannelCounts,
    /// Sum of download counters over all records.
    pub total_downloads: i64,
    /// Cumulative uploads over the registry lifetime.
    pub total_uploads: u64,
}

/// Active record count per channel.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ChannelCounts {
    pub release: usize,
    pub beta: usize,
    pub archive: usize,
}

/// Derive statistics from a registry snapshot.
pub fn aggregate(packages: &[PackageRecord], total_uploads: u64) -> StorageStats {
    let active_packages = packages.iter().filter(|r| r.is_active).count();
    let total_size_bytes: i64 = packages.iter().map(|r| r.size_bytes).sum();
    let total_downloads: i64 = packages.iter().map(|r| r.download_count).sum();

    let mut channels = ChannelCounts::default();
    for record in packages.iter().filter(|r| r.is_active) {
        match record.channel {
            Channel::Release => channels.release += 1,
            Channel::Beta => channels.beta += 1,
            Channel::Archive => channels.archive += 1,
        }
    }

    StorageStats {
        total_packages: packages.len(),
        active_packages,
        inactive_packages: packages.len() - active_packages,
        total_size_bytes,
        total_size_mb: (total_size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
        channels,
        total_downloads,
        total_uploads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(channel: Channel, active: bool, size: i64, downloads: i64) -> PackageRecord {
        PackageRecord {
            id: Uuid::new_v4(),
            stored_filename: "pkg.apk".to_string(),
            original_filename: "app.apk".to_string(),
            version: "1.0.0".to_string(),
            channel,
            uploaded_at: Utc::now(),
            size_bytes: size,
            checksum_sha256: String::new(),
            description: String::new(),
            download_count: downloads,
            is_active: active,
            deleted_at: None,
            archived_at: None,
        }
    }

    #[test]
    fn test_empty_registry() {
        let stats = aggregate(&[], 0);
        assert_eq!(stats.total_packages, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert_eq!(stats.total_size_mb, 0.0);
    }

    #[test]
    fn test_counts_partition_record_set() {
        let packages = vec![
            record(Channel::Release, true, 100, 3),
            record(Channel::Release, false, 200, 1),
            record(Channel::Beta, true, 300, 0),
        ];
        let stats = aggregate(&packages, 3);

        assert_eq!(stats.total_packages, 3);
        assert_eq!(stats.active_packages + stats.inactive_packages, 3);
        assert_eq!(stats.active_packages, 2);
        // Size sums over ALL records, including inactive ones
        assert_eq!(stats.total_size_bytes, 600);
        assert_eq!(stats.total_downloads, 4);
        assert_eq!(stats.total_uploads, 3);
        // Channel breakdown counts active records only
        assert_eq!(stats.channels.release, 1);
        assert_eq!(stats.channels.beta, 1);
        assert_eq!(stats.channels.archive, 0);
    }

    #[test]
    fn test_mb_conversion_rounds_to_two_decimals() {
        let packages = vec![record(Channel::Release, true, 5 * 1024 * 1024 + 512 * 1024, 0)];
        let stats = aggregate(&packages, 1);
        assert_eq!(stats.total_size_mb, 5.5);
    }
}
