//! Version ordering and assignment.
//!
//! Versions are opaque dot-separated strings. For ordering they are read as
//! tuples: numeric segments compare numerically, non-numeric segments compare
//! lexically, and a numeric segment sorts below a non-numeric one at the same
//! position. Shorter tuples are zero-padded, so `1.2` and `1.2.0` compare
//! equal while remaining distinct strings for storage and conflict checks.

use std::cmp::Ordering;

use crate::error::{AppError, Result};
use crate::models::{Channel, PackageRecord};

/// Version assigned to the first upload in an empty channel.
pub const SEED_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Number(u64),
    Text(String),
}

impl Segment {
    fn parse(raw: &str) -> Segment {
        match raw.parse::<u64>() {
            Ok(n) => Segment::Number(n),
            Err(_) => Segment::Text(raw.to_string()),
        }
    }
}

/// Comparison key for a version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionKey {
    segments: Vec<Segment>,
}

impl VersionKey {
    pub fn parse(version: &str) -> VersionKey {
        VersionKey {
            segments: version.split('.').map(Segment::parse).collect(),
        }
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            // Missing segments pad with zero
            let a = self.segments.get(i).cloned().unwrap_or(Segment::Number(0));
            let b = other.segments.get(i).cloned().unwrap_or(Segment::Number(0));
            let ord = match (a, b) {
                (Segment::Number(x), Segment::Number(y)) => x.cmp(&y),
                (Segment::Text(x), Segment::Text(y)) => x.cmp(&y),
                (Segment::Number(_), Segment::Text(_)) => Ordering::Less,
                (Segment::Text(_), Segment::Number(_)) => Ordering::Greater,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Increment the right-most numeric segment of a version string.
///
/// Returns `None` when no segment is numeric.
pub fn increment_lowest_numeric(version: &str) -> Option<String> {
    let mut parts: Vec<String> = version.split('.').map(str::to_string).collect();
    for part in parts.iter_mut().rev() {
        if let Ok(n) = part.parse::<u64>() {
            *part = (n + 1).to_string();
            return Some(parts.join("."));
        }
    }
    None
}

/// Determine the version to assign to an upload.
///
/// With an explicit version, an exact string match against any active record
/// in the channel is a conflict. Without one, the highest active version is
/// incremented at its lowest-order numeric segment; an empty channel (or a
/// highest version with no numeric segment) seeds at [`SEED_VERSION`]. The
/// derived version is then subject to the same exact-string conflict check.
pub fn resolve(
    channel: Channel,
    explicit: Option<&str>,
    active_in_channel: &[PackageRecord],
) -> Result<String> {
    let conflict = |version: &str| {
        AppError::Conflict(format!(
            "version {} already exists in {} channel",
            version, channel
        ))
    };

    if let Some(version) = explicit {
        if active_in_channel.iter().any(|r| r.version == version) {
            return Err(conflict(version));
        }
        return Ok(version.to_string());
    }

    // max_by keeps the last of equal elements, so among versions that compare
    // equal (e.g. "1.2" vs "1.2.0") the most recently inserted record wins.
    let derived = active_in_channel
        .iter()
        .max_by(|a, b| VersionKey::parse(&a.version).cmp(&VersionKey::parse(&b.version)))
        .and_then(|top| increment_lowest_numeric(&top.version))
        .unwrap_or_else(|| SEED_VERSION.to_string());

    if active_in_channel.iter().any(|r| r.version == derived) {
        return Err(conflict(&derived));
    }
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(version: &str) -> PackageRecord {
        PackageRecord {
            id: Uuid::new_v4(),
            stored_filename: format!("{}.apk", version),
            original_filename: "app.apk".to_string(),
            version: version.to_string(),
            channel: Channel::Release,
            uploaded_at: Utc::now(),
            size_bytes: 1,
            checksum_sha256: String::new(),
            description: String::new(),
            download_count: 0,
            is_active: true,
            deleted_at: None,
            archived_at: None,
        }
    }

    fn key(v: &str) -> VersionKey {
        VersionKey::parse(v)
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(key("1.10.0") > key("1.9.0"));
        assert!(key("2.0.0") > key("1.99.99"));
        assert!(key("0.1.0") < key("0.1.1"));
    }

    #[test]
    fn test_zero_padding_makes_short_tuples_equal() {
        // "1.2" and "1.2.0" are distinct strings but equal for comparison
        assert_eq!(key("1.2").cmp(&key("1.2.0")), Ordering::Equal);
        assert!(key("1.2") < key("1.2.1"));
    }

    #[test]
    fn test_non_numeric_segments_compare_lexically() {
        assert!(key("1.0.alpha") < key("1.0.beta"));
        // A numeric segment sorts below a non-numeric one
        assert!(key("1.0.0") < key("1.0.alpha"));
    }

    #[test]
    fn test_increment_lowest_numeric() {
        assert_eq!(increment_lowest_numeric("1.1.0").as_deref(), Some("1.1.1"));
        assert_eq!(increment_lowest_numeric("1.9").as_deref(), Some("1.10"));
        assert_eq!(
            increment_lowest_numeric("2.0.rc").as_deref(),
            Some("2.1.rc")
        );
        assert_eq!(increment_lowest_numeric("alpha.beta"), None);
    }

    #[test]
    fn test_resolve_seeds_empty_channel() {
        let assigned = resolve(Channel::Release, None, &[]).unwrap();
        assert_eq!(assigned, SEED_VERSION);
    }

    #[test]
    fn test_resolve_increments_highest_version() {
        let active = vec![record("1.0.0"), record("1.1.0")];
        let assigned = resolve(Channel::Release, None, &active).unwrap();
        assert_eq!(assigned, "1.1.1");
    }

    #[test]
    fn test_resolve_highest_by_version_not_insertion_order() {
        let active = vec![record("1.2.0"), record("1.0.5")];
        let assigned = resolve(Channel::Release, None, &active).unwrap();
        assert_eq!(assigned, "1.2.1");
    }

    #[test]
    fn test_resolve_explicit_conflict() {
        let active = vec![record("1.0.0")];
        let err = resolve(Channel::Release, Some("1.0.0"), &active).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_resolve_explicit_accepts_new_version() {
        let active = vec![record("1.0.0")];
        let assigned = resolve(Channel::Release, Some("0.9.0"), &active).unwrap();
        assert_eq!(assigned, "0.9.0");
    }

    #[test]
    fn test_resolve_equal_keys_take_latest_record() {
        // "1.2" and "1.2.0" compare equal; the later record wins the max, so
        // its string is the one incremented.
        let active = vec![record("1.2"), record("1.2.0")];
        let assigned = resolve(Channel::Release, None, &active).unwrap();
        assert_eq!(assigned, "1.2.1");

        let active = vec![record("1.2.0"), record("1.2")];
        let assigned = resolve(Channel::Release, None, &active).unwrap();
        assert_eq!(assigned, "1.3");
    }

    #[test]
    fn test_resolve_explicit_distinct_string_despite_equal_key() {
        // Equal comparison keys do not make distinct strings conflict
        let active = vec![record("1.2.0")];
        let assigned = resolve(Channel::Release, Some("1.2"), &active).unwrap();
        assert_eq!(assigned, "1.2");
    }

    #[test]
    fn test_resolve_seeds_when_highest_has_no_numeric_segment() {
        let active = vec![record("alpha")];
        let assigned = resolve(Channel::Release, None, &active).unwrap();
        assert_eq!(assigned, SEED_VERSION);
    }
}
