//! Upload validation gate.
//!
//! Checks run in a fixed order: size ceiling, filename extension, declared
//! content type. The content-type check is purely declarative: nothing sniffs
//! the payload, so a mislabeled file with the right extension passes. Known
//! weak point, kept as-is.

use crate::error::{AppError, Result};

/// The single accepted filename suffix.
pub const PACKAGE_EXTENSION: &str = ".apk";

/// Android package archive MIME type, also used for download responses.
pub const PACKAGE_CONTENT_TYPE: &str = "application/vnd.android.package-archive";

/// Declared content types accepted on upload.
pub const ALLOWED_CONTENT_TYPES: [&str; 2] =
    [PACKAGE_CONTENT_TYPE, "application/octet-stream"];

/// Validate an upload before anything is persisted.
///
/// A missing declared content type is treated as `application/octet-stream`;
/// content-type parameters (`; boundary=...`) are ignored.
pub fn validate_upload(
    original_filename: &str,
    declared_content_type: Option<&str>,
    size_bytes: u64,
    max_size_bytes: u64,
) -> Result<()> {
    if size_bytes > max_size_bytes {
        return Err(AppError::Validation(format!(
            "file size ({} bytes) exceeds maximum allowed size ({} bytes)",
            size_bytes, max_size_bytes
        )));
    }

    if !original_filename
        .to_lowercase()
        .ends_with(PACKAGE_EXTENSION)
    {
        return Err(AppError::Validation(format!(
            "file must have {} extension",
            PACKAGE_EXTENSION
        )));
    }

    let content_type = declared_content_type
        .unwrap_or("application/octet-stream")
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(AppError::Validation(format!(
            "unsupported content type '{}'",
            content_type
        )));
    }

    Ok(())
}
