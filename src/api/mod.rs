//! API module - HTTP handlers and routes.

pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::registry::RegistryStore;
use crate::services::package_service::PackageService;
use crate::services::retention_service::RetentionService;
use crate::storage::ChannelStorage;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub registry: Arc<RegistryStore>,
    pub storage: Arc<ChannelStorage>,
}

impl AppState {
    pub fn new(config: Config, registry: Arc<RegistryStore>, storage: Arc<ChannelStorage>) -> Self {
        Self {
            config,
            registry,
            storage,
        }
    }

    /// Create a PackageService over the shared registry and storage.
    pub fn package_service(&self) -> PackageService {
        PackageService::new(
            self.registry.clone(),
            self.storage.clone(),
            self.config.max_upload_size_bytes,
        )
    }

    /// Create a RetentionService over the shared registry and storage.
    pub fn retention_service(&self) -> RetentionService {
        RetentionService::new(self.registry.clone(), self.storage.clone())
    }
}

pub type SharedState = Arc<AppState>;
