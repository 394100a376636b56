//! Common test utilities for integration and handler tests.
//!
//! Builds real application state over a temp directory, so tests exercise
//! the actual registry document and channel partitions on disk.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use bytes::Bytes;
use tempfile::TempDir;

use apk_depot_backend::api::{AppState, SharedState};
use apk_depot_backend::config::Config;
use apk_depot_backend::models::Channel;
use apk_depot_backend::registry::RegistryStore;
use apk_depot_backend::services::package_service::{PackageService, UploadRequest};
use apk_depot_backend::services::retention_service::RetentionService;
use apk_depot_backend::storage::ChannelStorage;
use apk_depot_backend::validation::PACKAGE_CONTENT_TYPE;

/// Test context owning the temp directory behind the state.
pub struct TestContext {
    _tmp: TempDir,
    pub state: SharedState,
}

impl TestContext {
    pub async fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let config = Config {
            bind_address: "127.0.0.1:0".to_string(),
            log_level: "debug".to_string(),
            storage_path: tmp.path().join("storage").to_string_lossy().into_owned(),
            registry_path: tmp
                .path()
                .join("registry.json")
                .to_string_lossy()
                .into_owned(),
            max_upload_size_bytes: 100 * 1024 * 1024,
        };

        let registry = Arc::new(
            RegistryStore::open(&config.registry_path)
                .await
                .expect("failed to open registry"),
        );
        let storage = Arc::new(
            ChannelStorage::init(&config.storage_path)
                .await
                .expect("failed to init storage"),
        );
        let state = Arc::new(AppState::new(config, registry, storage));

        Self { _tmp: tmp, state }
    }

    pub fn packages(&self) -> PackageService {
        self.state.package_service()
    }

    pub fn retention(&self) -> RetentionService {
        self.state.retention_service()
    }
}

/// Build an upload request for the service layer.
pub fn upload_request(bytes: &[u8], version: Option<&str>, channel: Channel) -> UploadRequest {
    UploadRequest {
        original_filename: "app.apk".to_string(),
        declared_content_type: Some(PACKAGE_CONTENT_TYPE.to_string()),
        data: Bytes::copy_from_slice(bytes),
        version: version.map(str::to_string),
        channel,
        description: String::new(),
    }
}

/// Build a multipart upload HTTP request for router-level tests.
pub fn multipart_upload(uri: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "apk-depot-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not valid JSON")
}
