pub mod apply_watch_config;
pub mod delete_photo;
pub mod get_thumbnail;
pub mod ingest_photo;
pub mod list_photos;
pub mod lookup_photo;
pub mod start_photo_watcher;
pub mod stop_photo_watcher;
pub mod upload_photo;

#[cfg(test)]
pub(crate) mod test_support;

pub use apply_watch_config::{ApplyWatchConfig, ApplyWatchConfigError};
pub use delete_photo::DeletePhoto;
pub use get_thumbnail::GetThumbnail;
pub use ingest_photo::{combine_sessions, IngestPhoto};
pub use list_photos::ListPhotos;
pub use lookup_photo::LookupPhoto;
pub use start_photo_watcher::{StartPhotoWatcher, StartPhotoWatcherError};
pub use stop_photo_watcher::StopPhotoWatcher;
pub use upload_photo::{UploadPhoto, UploadPhotoError};
