use std::sync::Arc;

use sl_core::ports::{WatcherControlError, WatcherControlPort};
use tracing::{info, info_span, Instrument};

/// Stop the photo watcher. Stopping a stopped watcher is a no-op.
pub struct StopPhotoWatcher {
    watcher_control: Arc<dyn WatcherControlPort>,
}

impl StopPhotoWatcher {
    pub fn new(watcher_control: Arc<dyn WatcherControlPort>) -> Self {
        Self { watcher_control }
    }

    pub async fn execute(&self) -> Result<(), WatcherControlError> {
        let span = info_span!("usecase.stop_photo_watcher.execute");

        async {
            match self.watcher_control.stop_watcher().await {
                Ok(()) => {
                    info!("Photo watcher stopped");
                    Ok(())
                }
                // The background runtime is already gone, so nothing is watching.
                Err(WatcherControlError::ChannelClosed) => {
                    info!("Photo watcher runtime already shut down");
                    Ok(())
                }
                Err(err) => Err(err),
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sl_core::WatchConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeWatcherControl {
        stops: AtomicUsize,
        closed: bool,
    }

    #[async_trait]
    impl WatcherControlPort for FakeWatcherControl {
        async fn start_watcher(&self, _config: WatchConfig) -> Result<(), WatcherControlError> {
            Ok(())
        }

        async fn stop_watcher(&self) -> Result<(), WatcherControlError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if self.closed {
                return Err(WatcherControlError::ChannelClosed);
            }
            Ok(())
        }

        async fn apply_config(&self, _config: WatchConfig) -> Result<(), WatcherControlError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn stop_is_forwarded() {
        let control = Arc::new(FakeWatcherControl {
            stops: AtomicUsize::new(0),
            closed: false,
        });

        StopPhotoWatcher::new(control.clone()).execute().await.unwrap();

        assert_eq!(control.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stopping_after_shutdown_succeeds() {
        let control = Arc::new(FakeWatcherControl {
            stops: AtomicUsize::new(0),
            closed: true,
        });

        assert!(StopPhotoWatcher::new(control).execute().await.is_ok());
    }
}
