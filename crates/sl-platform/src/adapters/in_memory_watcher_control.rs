use sl_core::ports::watcher_control::{WatcherControlError, WatcherControlPort};
use sl_core::WatchConfig;
use tokio::sync::{mpsc, oneshot};

use crate::ipc::{PlatformCommand, WatcherReply};
use crate::runtime::event_bus::PlatformCommandSender;
use crate::watcher::WatcherError;

/// In-memory watcher control implementation.
///
/// Sends lifecycle commands through the in-process command channel and waits
/// for the runtime's reply, so start failures reach the caller.
pub struct InMemoryWatcherControl {
    cmd_tx: PlatformCommandSender,
}

impl InMemoryWatcherControl {
    pub fn new(cmd_tx: PlatformCommandSender) -> Self {
        Self { cmd_tx }
    }

    async fn request(
        &self,
        build: impl FnOnce(WatcherReply) -> PlatformCommand,
        on_error: fn(String) -> WatcherControlError,
    ) -> Result<(), WatcherControlError> {
        let (reply, response) = oneshot::channel();
        self.cmd_tx
            .send(build(reply))
            .await
            .map_err(|e: mpsc::error::SendError<PlatformCommand>| {
                if self.cmd_tx.is_closed() {
                    WatcherControlError::ChannelClosed
                } else {
                    on_error(e.to_string())
                }
            })?;

        match response.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(WatcherError::DirectoryUnavailable(path))) => {
                Err(WatcherControlError::DirectoryUnavailable(path))
            }
            Ok(Err(WatcherError::AlreadyStopped)) | Err(_) => Err(WatcherControlError::ChannelClosed),
            Ok(Err(err)) => Err(on_error(err.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl WatcherControlPort for InMemoryWatcherControl {
    async fn start_watcher(&self, config: WatchConfig) -> Result<(), WatcherControlError> {
        self.request(
            |reply| PlatformCommand::StartWatcher {
                config,
                reply: Some(reply),
            },
            WatcherControlError::StartFailed,
        )
        .await
    }

    async fn stop_watcher(&self) -> Result<(), WatcherControlError> {
        self.request(
            |reply| PlatformCommand::StopWatcher { reply: Some(reply) },
            WatcherControlError::StopFailed,
        )
        .await
    }

    async fn apply_config(&self, config: WatchConfig) -> Result<(), WatcherControlError> {
        self.request(
            |reply| PlatformCommand::ConfigUpdated {
                config,
                reply: Some(reply),
            },
            WatcherControlError::ConfigFailed,
        )
        .await
    }
}
