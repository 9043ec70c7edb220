//! # Application Dependencies
//!
//! Dependency grouping for use case construction. This is NOT a builder:
//! no build steps, no defaults, no hidden logic. Every field is required.

use std::sync::Arc;

use sl_core::ports::*;

pub struct AppDeps {
    // Metadata sources
    pub session_context: Arc<dyn SessionContextPort>,
    pub embedded_metadata: Arc<dyn EmbeddedMetadataPort>,

    // Storage
    pub photo_repo: Arc<dyn PhotoRecordRepositoryPort>,

    // Image pipeline
    pub image_transform: Arc<dyn ImageTransformPort>,
    pub thumbnails: Arc<dyn ThumbnailProviderPort>,

    // Upload collaborator
    pub uploader: Arc<dyn PhotoUploadPort>,
    pub verification: Arc<dyn VerificationPort>,

    // Platform
    pub watcher_control: Arc<dyn WatcherControlPort>,
}
