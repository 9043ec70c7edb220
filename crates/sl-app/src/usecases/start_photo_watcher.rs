//! Use case for starting the photo watcher

use std::sync::Arc;

use sl_core::error::{Classify, ErrorClass};
use sl_core::ports::{WatcherControlError, WatcherControlPort};
use sl_core::WatchConfig;
use tracing::{info, info_span, warn, Instrument};

use crate::events::{PipelineEvent, PipelineEvents};

#[derive(Debug, thiserror::Error)]
pub enum StartPhotoWatcherError {
    #[error("photo directory is not configured")]
    NoPhotosDir,

    #[error(transparent)]
    Control(#[from] WatcherControlError),
}

impl Classify for StartPhotoWatcherError {
    fn class(&self) -> ErrorClass {
        match self {
            StartPhotoWatcherError::NoPhotosDir => ErrorClass::NotFound,
            StartPhotoWatcherError::Control(err) => err.class(),
        }
    }
}

/// Use case for starting the photo watcher.
///
/// ## Behavior
/// - Requests the watcher to start through the [`WatcherControlPort`]
/// - Starting an already-running watcher restarts it with the new config
/// - A failure is reported to the UI as [`PipelineEvent::WatcherError`] and
///   returned; the host process keeps running
pub struct StartPhotoWatcher {
    watcher_control: Arc<dyn WatcherControlPort>,
    events: PipelineEvents,
}

impl StartPhotoWatcher {
    pub fn new(watcher_control: Arc<dyn WatcherControlPort>, events: PipelineEvents) -> Self {
        Self {
            watcher_control,
            events,
        }
    }

    pub async fn execute(&self, config: WatchConfig) -> Result<(), StartPhotoWatcherError> {
        let span = info_span!(
            "usecase.start_photo_watcher.execute",
            photos_dir = %config.photos_dir.display(),
            mode = ?config.mode,
        );

        async {
            info!("Requesting photo watcher to start");

            let result = if config.photos_dir.as_os_str().is_empty() {
                Err(StartPhotoWatcherError::NoPhotosDir)
            } else {
                self.watcher_control
                    .start_watcher(config)
                    .await
                    .map_err(StartPhotoWatcherError::from)
            };

            match &result {
                Ok(()) => info!("Photo watcher started"),
                Err(err) => {
                    warn!(error = %err, "Photo watcher did not start");
                    self.events.emit(PipelineEvent::WatcherError {
                        message: err.to_string(),
                    });
                }
            }
            result
        }
        .instrument(span)
        .await
    }
}
