use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::WatchConfig;
use crate::error::{Classify, ErrorClass};

/// Port for controlling the change watcher lifecycle.
///
/// # Behavior
/// - `start_watcher()` is idempotent: a running watcher is torn down first.
/// - `stop_watcher()` is idempotent.
/// - `apply_config()` restarts the watcher when the watched source changed.
#[async_trait]
pub trait WatcherControlPort: Send + Sync {
    /// Request the watcher to start with `config`.
    async fn start_watcher(&self, config: WatchConfig) -> Result<(), WatcherControlError>;

    /// Request the watcher to stop.
    async fn stop_watcher(&self) -> Result<(), WatcherControlError>;

    /// Hand a new configuration snapshot to the running watcher.
    async fn apply_config(&self, config: WatchConfig) -> Result<(), WatcherControlError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WatcherControlError {
    #[error("Watch directory unavailable: {}", .0.display())]
    DirectoryUnavailable(PathBuf),

    #[error("Failed to start watcher: {0}")]
    StartFailed(String),

    #[error("Failed to stop watcher: {0}")]
    StopFailed(String),

    #[error("Failed to apply watcher config: {0}")]
    ConfigFailed(String),

    #[error("Watcher channel closed")]
    ChannelClosed,
}

impl Classify for WatcherControlError {
    fn class(&self) -> ErrorClass {
        match self {
            WatcherControlError::DirectoryUnavailable(_) => ErrorClass::NotFound,
            WatcherControlError::StartFailed(_)
            | WatcherControlError::StopFailed(_)
            | WatcherControlError::ConfigFailed(_) => ErrorClass::TransientIo,
            WatcherControlError::ChannelClosed => ErrorClass::Fatal,
        }
    }
}
