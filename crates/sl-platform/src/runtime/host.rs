use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use sl_core::ports::{KeepRunningPort, NewPhotoHandler};
use tokio::sync::mpsc;
use tracing::{error, info};

use super::event_bus::{PlatformCommandSender, COMMAND_CHANNEL_CAPACITY, EVENT_CHANNEL_CAPACITY};
use super::runtime::PlatformRuntime;
use crate::adapters::InMemoryWatcherControl;
use crate::ipc::PlatformCommand;

/// Runs the platform runtime on a dedicated thread with its own tokio
/// runtime, so watching continues independently of the interactive context.
///
/// The two sides only talk through channels: commands go in, new photos come
/// out through the [`NewPhotoHandler`] given to [`BackgroundHost::spawn`].
pub struct BackgroundHost {
    commands: PlatformCommandSender,
    thread: Option<JoinHandle<()>>,
}

impl BackgroundHost {
    pub fn spawn(
        photo_handler: Arc<dyn NewPhotoHandler>,
        keep_running: Arc<dyn KeepRunningPort>,
    ) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let thread = std::thread::Builder::new()
            .name("snaplog-watcher".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!(error = %err, "Failed to build watcher runtime");
                        return;
                    }
                };
                let platform = PlatformRuntime::new(event_tx, event_rx, command_rx, Some(photo_handler))
                    .with_keep_running(keep_running);
                runtime.block_on(platform.start());
            })
            .context("spawn watcher thread")?;

        info!("Background watcher host started");
        Ok(Self {
            commands: command_tx,
            thread: Some(thread),
        })
    }

    pub fn commands(&self) -> PlatformCommandSender {
        self.commands.clone()
    }

    pub fn watcher_control(&self) -> InMemoryWatcherControl {
        InMemoryWatcherControl::new(self.commands.clone())
    }

    /// Stop the watcher, end the runtime loop and join the thread.
    pub async fn shutdown(mut self) -> Result<()> {
        // A closed channel means the loop already ended.
        let _ = self.commands.send(PlatformCommand::Shutdown).await;
        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || thread.join())
                .await
                .context("join watcher thread")?
                .map_err(|_| anyhow::anyhow!("watcher thread panicked"))?;
        }
        info!("Background watcher host stopped");
        Ok(())
    }
}
