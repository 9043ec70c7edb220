//! # sl-core
//!
//! Core domain models and port definitions for Snaplog.
//!
//! This crate contains pure domain logic without any infrastructure dependencies:
//! session metadata, photo records and their merge rules, the producer's
//! screenshot filename grammar, thumbnail cache keys and the port traits that
//! infrastructure and platform crates implement.

pub mod app_dirs;
pub mod config;
pub mod error;
pub mod ids;
pub mod photo;
pub mod ports;
pub mod thumbnail;

// Re-export commonly used types at the crate root
pub use config::{AppConfig, WatchConfig, WatchMode};
pub use error::{Classify, ErrorClass};
pub use ids::PhotoRecordKey;
pub use photo::{
    AccessType, Identity, InstanceId, PhotoRecord, Roster, ScreenshotName, SessionMetadata,
    WorldDescriptor,
};
pub use thumbnail::ThumbnailKey;
