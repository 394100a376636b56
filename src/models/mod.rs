//! Domain models.

pub mod package;

pub use package::{Channel, PackageRecord};
