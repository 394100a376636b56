//! Application configuration loaded from environment variables.

use std::env;

/// Default upload size ceiling: 100 MB.
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (host:port)
    pub bind_address: String,

    /// Log level
    pub log_level: String,

    /// Root directory for channel storage partitions
    pub storage_path: String,

    /// Path of the registry JSON document
    pub registry_path: String,

    /// Maximum accepted upload size in bytes
    pub max_upload_size_bytes: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            storage_path: env::var("STORAGE_PATH").unwrap_or_else(|_| "./apk_storage".into()),
            registry_path: env::var("REGISTRY_PATH")
                .unwrap_or_else(|_| "./apk_registry.json".into()),
            max_upload_size_bytes: env::var("MAX_UPLOAD_SIZE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_BYTES),
        }
    }
}
