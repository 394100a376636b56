//! Service layer.

pub mod package_service;
pub mod retention_service;
pub mod stats_service;
