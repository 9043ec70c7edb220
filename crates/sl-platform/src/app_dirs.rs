use std::path::PathBuf;

use sl_core::{
    app_dirs::AppDirs,
    ports::{AppDirsError, AppDirsPort},
};

const APP_DIR_NAME: &str = "snaplog";

fn resolved_app_dir_name() -> String {
    match std::env::var("SNAPLOG_PROFILE") {
        Ok(profile) if !profile.is_empty() => format!("{APP_DIR_NAME}-{profile}"),
        _ => APP_DIR_NAME.to_string(),
    }
}

/// Resolves per-user data and cache roots through `dirs`.
pub struct DirsAppDirsAdapter {
    base_dir_override: Option<PathBuf>,
}

impl DirsAppDirsAdapter {
    pub fn new() -> Self {
        Self {
            base_dir_override: None,
        }
    }

    /// Use `base` for both the data and the cache root.
    ///
    /// Set by `paths.data_dir` in the config file, and by tests.
    pub fn with_base_dir(base: PathBuf) -> Self {
        Self {
            base_dir_override: Some(base),
        }
    }

    fn base_data_local_dir(&self) -> Option<PathBuf> {
        if let Some(base) = &self.base_dir_override {
            return Some(base.clone());
        }
        dirs::data_local_dir()
    }

    fn base_cache_dir(&self) -> Option<PathBuf> {
        if let Some(base) = &self.base_dir_override {
            return Some(base.join("cache"));
        }
        dirs::cache_dir()
    }
}

impl Default for DirsAppDirsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl AppDirsPort for DirsAppDirsAdapter {
    fn get_app_dirs(&self) -> Result<AppDirs, AppDirsError> {
        let base_data = self
            .base_data_local_dir()
            .ok_or(AppDirsError::DataLocalDirUnavailable)?;
        let base_cache = self
            .base_cache_dir()
            .ok_or(AppDirsError::CacheDirUnavailable)?;
        let app_dir_name = resolved_app_dir_name();

        Ok(AppDirs {
            app_data_root: base_data.join(&app_dir_name),
            app_cache_root: base_cache.join(&app_dir_name),
        })
    }
}

/// Default screenshot folder of the producer: `<Pictures>/VRChat`.
pub fn default_photos_dir() -> Option<PathBuf> {
    dirs::picture_dir().map(|pictures| pictures.join("VRChat"))
}

/// Default session log folder of the producer.
///
/// The producer only runs on Windows, where logs live under
/// `%USERPROFILE%\AppData\LocalLow\VRChat\VRChat`.
pub fn default_logs_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join("AppData")
            .join("LocalLow")
            .join("VRChat")
            .join("VRChat")
    })
}
