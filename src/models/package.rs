//! Package record model and release channels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Release channel. Each channel maps to its own storage partition and carries
/// independent version numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Release,
    Beta,
    Archive,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Release, Channel::Beta, Channel::Archive];

    /// Channels that the archive operation drains. The archive channel itself
    /// is never a source.
    pub const ARCHIVABLE: [Channel; 2] = [Channel::Release, Channel::Beta];

    /// Parse a channel name, rejecting anything outside the fixed set.
    pub fn parse(name: &str) -> Option<Channel> {
        match name {
            "release" => Some(Channel::Release),
            "beta" => Some(Channel::Beta),
            "archive" => Some(Channel::Archive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Release => "release",
            Channel::Beta => "beta",
            Channel::Archive => "archive",
        }
    }

    /// Directory name of the channel's storage partition.
    pub fn partition(&self) -> &'static str {
        match self {
            Channel::Release => "releases",
            Channel::Beta => "beta",
            Channel::Archive => "archive",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registry entry per uploaded package artifact.
///
/// The identifier is assigned at upload time and never reused. The stored
/// filename is derived from identifier + version; the physical location is
/// always `storage_root/<channel partition>/<stored_filename>` and is never
/// kept in the record itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageRecord {
    pub id: Uuid,
    pub stored_filename: String,
    pub original_filename: String,
    pub version: String,
    pub channel: Channel,
    pub uploaded_at: DateTime<Utc>,
    pub size_bytes: i64,
    pub checksum_sha256: String,
    pub description: String,
    pub download_count: i64,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse_roundtrip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::parse(channel.as_str()), Some(channel));
        }
        assert_eq!(Channel::parse("nightly"), None);
        assert_eq!(Channel::parse("Release"), None);
    }

    #[test]
    fn test_channel_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Channel::Release).unwrap(), "\"release\"");
        let parsed: Channel = serde_json::from_str("\"beta\"").unwrap();
        assert_eq!(parsed, Channel::Beta);
    }
}
