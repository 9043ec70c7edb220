//! Application runtime: wired dependencies plus the use-case accessor.

use sl_app::usecases::{
    ApplyWatchConfig, DeletePhoto, GetThumbnail, IngestPhoto, ListPhotos, LookupPhoto,
    StartPhotoWatcher, StopPhotoWatcher, UploadPhoto,
};
use sl_app::{AppDeps, PipelineEvents};
use sl_core::config::AppConfig;
use sl_core::ports::AuthContext;

pub struct AppRuntime {
    pub deps: AppDeps,
    config: AppConfig,
    events: PipelineEvents,
}

impl AppRuntime {
    pub fn new(deps: AppDeps, config: AppConfig, events: PipelineEvents) -> Self {
        Self {
            deps,
            config,
            events,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn events(&self) -> &PipelineEvents {
        &self.events
    }

    /// Replace the configuration snapshot. The caller applies watcher
    /// changes through [`UseCases::apply_watch_config`].
    pub fn set_config(&mut self, config: AppConfig) -> AppConfig {
        std::mem::replace(&mut self.config, config)
    }

    pub fn usecases(&self) -> UseCases<'_> {
        UseCases::new(self)
    }
}

/// Factory for use cases wired from this runtime's [`AppDeps`].
///
/// Callers never need to know which ports a use case consumes.
pub struct UseCases<'a> {
    runtime: &'a AppRuntime,
}

impl<'a> UseCases<'a> {
    pub fn new(runtime: &'a AppRuntime) -> Self {
        Self { runtime }
    }

    fn auth(&self) -> AuthContext {
        let upload = &self.runtime.config.upload;
        AuthContext {
            user_id: upload.user_id.clone(),
            token: upload.auth_token.clone(),
        }
    }

    /// Ingest use case; uploads as well when upload is enabled in config.
    pub fn ingest_photo(&self) -> IngestPhoto {
        let ingest = IngestPhoto::from_deps(&self.runtime.deps, self.runtime.events.clone());
        if self.runtime.config.upload.enabled {
            ingest.with_upload(self.upload_photo())
        } else {
            ingest
        }
    }

    pub fn upload_photo(&self) -> UploadPhoto {
        let deps = &self.runtime.deps;
        UploadPhoto::new(
            deps.image_transform.clone(),
            deps.uploader.clone(),
            deps.verification.clone(),
            deps.photo_repo.clone(),
            self.auth(),
        )
    }

    pub fn get_thumbnail(&self) -> GetThumbnail {
        GetThumbnail::new(
            self.runtime.deps.thumbnails.clone(),
            self.runtime.config.thumbnails.default_size,
        )
    }

    pub fn lookup_photo(&self) -> LookupPhoto {
        LookupPhoto::new(self.runtime.deps.photo_repo.clone())
    }

    pub fn list_photos(&self) -> ListPhotos {
        ListPhotos::new(self.runtime.deps.photo_repo.clone())
    }

    pub fn delete_photo(&self) -> DeletePhoto {
        DeletePhoto::new(self.runtime.deps.photo_repo.clone())
    }

    pub fn start_photo_watcher(&self) -> StartPhotoWatcher {
        StartPhotoWatcher::new(
            self.runtime.deps.watcher_control.clone(),
            self.runtime.events.clone(),
        )
    }

    pub fn stop_photo_watcher(&self) -> StopPhotoWatcher {
        StopPhotoWatcher::new(self.runtime.deps.watcher_control.clone())
    }

    pub fn apply_watch_config(&self) -> ApplyWatchConfig {
        ApplyWatchConfig::new(
            self.runtime.deps.watcher_control.clone(),
            self.runtime.events.clone(),
        )
    }
}
