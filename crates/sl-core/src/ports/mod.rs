//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases and the infrastructure or
//! platform implementations. Use cases only ever see these traits; adapters
//! are chosen by the composition root.

pub mod app_dirs;
mod clock;
pub mod embedded_metadata;
pub mod errors;
pub mod image_transform;
mod keep_running;
pub mod kv_store;
mod photo_handler;
pub mod photo_repository;
mod session_context;
pub mod thumbnail;
pub mod upload;
pub mod watcher_control;

pub use app_dirs::AppDirsPort;
pub use clock::*;
pub use embedded_metadata::{EmbeddedMetadataOutcome, EmbeddedMetadataPort};
pub use errors::AppDirsError;
pub use image_transform::{ImageTransformPort, TransformError, TransformedImage};
pub use keep_running::KeepRunningPort;
pub use kv_store::KeyValueStorePort;
pub use photo_handler::NewPhotoHandler;
pub use photo_repository::PhotoRecordRepositoryPort;
pub use session_context::SessionContextPort;
pub use thumbnail::{GeneratedThumbnail, ThumbnailGeneratorPort, ThumbnailImage, ThumbnailProviderPort};
pub use upload::{AuthContext, PhotoUploadPort, UploadError, VerificationPort, VerificationStatus};
pub use watcher_control::{WatcherControlError, WatcherControlPort};
