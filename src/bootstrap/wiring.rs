//! # Dependency Injection
//!
//! The only place that depends on `sl-infra`, `sl-platform` and `sl-app` at
//! once. It assembles adapters into [`AppDeps`] and makes no decisions of its
//! own; configuration has already been loaded by `config.rs`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sl_app::AppDeps;
use sl_core::app_dirs::AppDirs;
use sl_core::config::AppConfig;
use sl_core::ports::KeyValueStorePort;
use sl_infra::db::pool::{init_db_pool, DbPool};
use sl_infra::db::repositories::DieselKeyValueStore;
use sl_infra::db::DieselSqliteExecutor;
use sl_infra::fs::OutboxUploader;
use sl_infra::imaging::{ImageThumbnailGenerator, ImageTransformPipeline};
use sl_infra::metadata::EmbeddedMetadataReader;
use sl_infra::photo::PhotoRecordStore;
use sl_infra::session_log::LogSessionSource;
use sl_infra::thumbnail::{DiskTier, ThumbnailCache};
use sl_infra::SystemClock;
use sl_platform::adapters::{ChannelPhotoForwarder, ProcessKeepRunning};
use sl_platform::runtime::BackgroundHost;
use tokio::sync::mpsc;
use tracing::info;

/// Capacity of the channel carrying new photo paths from the watcher thread.
pub const NEW_PHOTO_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Directory initialization failed: {0}")]
    Directories(String),

    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    #[error("Watcher host initialization failed: {0}")]
    WatcherHost(String),
}

pub type WiringResult<T> = Result<T, WiringError>;

/// Everything the run loop needs besides the use cases.
pub struct WiredDependencies {
    pub deps: AppDeps,
    /// Owns the watcher thread; shut it down before exiting.
    pub host: BackgroundHost,
    /// Paths reported by the watcher, to be ingested on this side.
    pub new_photos: mpsc::Receiver<PathBuf>,
}

fn create_db_pool(db_path: &Path) -> WiringResult<DbPool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            WiringError::Directories(format!("create {}: {e}", parent.display()))
        })?;
    }
    let url = db_path.to_string_lossy();
    init_db_pool(&url).map_err(|e| WiringError::DatabaseInit(format!("{e:#}")))
}

/// Outbox for upload artifacts; `<data root>/outbox` unless configured.
pub fn outbox_dir(config: &AppConfig, dirs: &AppDirs) -> PathBuf {
    config
        .upload
        .outbox_dir
        .clone()
        .unwrap_or_else(|| dirs.app_data_root.join("outbox"))
}

/// Build all adapters and spawn the background watcher host.
///
/// The watcher is not started here; that is a use-case decision.
pub fn wire_dependencies(config: &AppConfig, dirs: &AppDirs) -> WiringResult<WiredDependencies> {
    let pool = create_db_pool(&dirs.database_path())?;
    let kv: Arc<dyn KeyValueStorePort> = Arc::new(DieselKeyValueStore::new(
        DieselSqliteExecutor::new(pool),
        Arc::new(SystemClock),
    ));

    let embedded_metadata = Arc::new(EmbeddedMetadataReader::new());
    let photo_repo = Arc::new(PhotoRecordStore::new(kv, embedded_metadata.clone()));
    let session_context = Arc::new(LogSessionSource::new(&config.paths.logs_dir));

    let thumbnails = Arc::new(ThumbnailCache::new(
        Arc::new(ImageThumbnailGenerator::new()),
        DiskTier::new(dirs.thumbnails_dir()),
        config.thumbnails.max_entries,
        config.thumbnails.max_bytes,
    ));

    let outbox = Arc::new(OutboxUploader::new(outbox_dir(config, dirs)));

    let (forwarder, new_photos) = ChannelPhotoForwarder::channel(NEW_PHOTO_CHANNEL_CAPACITY);
    let host = BackgroundHost::spawn(Arc::new(forwarder), Arc::new(ProcessKeepRunning::new()))
        .map_err(|e| WiringError::WatcherHost(format!("{e:#}")))?;

    info!(
        database = %dirs.database_path().display(),
        thumbnails = %dirs.thumbnails_dir().display(),
        outbox = %outbox.dir().display(),
        "Dependencies wired"
    );

    let deps = AppDeps {
        session_context,
        embedded_metadata,
        photo_repo,
        image_transform: Arc::new(ImageTransformPipeline::default()),
        thumbnails,
        uploader: outbox.clone(),
        verification: outbox,
        watcher_control: Arc::new(host.watcher_control()),
    };

    Ok(WiredDependencies {
        deps,
        host,
        new_photos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_core::ports::PhotoRecordRepositoryPort;

    fn dirs(root: &Path) -> AppDirs {
        AppDirs {
            app_data_root: root.join("data"),
            app_cache_root: root.join("cache"),
        }
    }

    #[test]
    fn outbox_defaults_under_data_root() {
        let root = tempfile::tempdir().unwrap();
        let mut config = AppConfig::empty();
        assert_eq!(
            outbox_dir(&config, &dirs(root.path())),
            root.path().join("data").join("outbox")
        );

        config.upload.outbox_dir = Some(PathBuf::from("/elsewhere"));
        assert_eq!(outbox_dir(&config, &dirs(root.path())), PathBuf::from("/elsewhere"));
    }

    #[tokio::test]
    async fn wiring_creates_the_database_and_a_live_host() {
        let root = tempfile::tempdir().unwrap();
        let dirs = dirs(root.path());

        let wired = wire_dependencies(&AppConfig::empty(), &dirs).unwrap();

        assert!(dirs.database_path().is_file());
        assert!(wired.deps.photo_repo.list().await.unwrap().is_empty());
        wired.host.shutdown().await.unwrap();
    }
}
