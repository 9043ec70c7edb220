use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use sl_core::ports::{KeepRunningPort, NewPhotoHandler};
use sl_core::WatchConfig;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::event_bus::{PlatformCommandReceiver, PlatformEventReceiver, PlatformEventSender};
use crate::ipc::{PlatformCommand, PlatformEvent, WatcherReply};
use crate::watcher::{PhotoWatcher, WatcherError};

const KEEP_RUNNING_REASON: &str = "watching for new screenshots";
/// New photos held while the handler is busy. Beyond this, new ones are dropped.
pub const PHOTO_BACKLOG_LIMIT: usize = 4096;

/// Event loop that owns the photo watcher.
///
/// Commands arrive on one channel, watcher events on another; every new
/// photo is handed to the registered [`NewPhotoHandler`] in arrival order.
/// The handler runs on its own task, so a slow consumer never keeps the
/// loop from serving commands.
pub struct PlatformRuntime {
    event_tx: PlatformEventSender,
    event_rx: PlatformEventReceiver,
    command_rx: PlatformCommandReceiver,
    watcher: PhotoWatcher,
    photo_handler: Option<Arc<dyn NewPhotoHandler>>,
    keep_running: Option<Arc<dyn KeepRunningPort>>,
    shutting_down: bool,
}

impl PlatformRuntime {
    pub fn new(
        event_tx: PlatformEventSender,
        event_rx: PlatformEventReceiver,
        command_rx: PlatformCommandReceiver,
        photo_handler: Option<Arc<dyn NewPhotoHandler>>,
    ) -> Self {
        Self {
            watcher: PhotoWatcher::new(event_tx.clone()),
            event_tx,
            event_rx,
            command_rx,
            photo_handler,
            keep_running: None,
            shutting_down: false,
        }
    }

    /// Hold `keep_running` for as long as the watcher runs.
    pub fn with_keep_running(mut self, keep_running: Arc<dyn KeepRunningPort>) -> Self {
        self.keep_running = Some(keep_running);
        self
    }

    /// Set the new-photo handler after construction.
    pub fn set_photo_handler(&mut self, handler: Arc<dyn NewPhotoHandler>) {
        self.photo_handler = Some(handler);
    }

    pub async fn start(mut self) {
        info!("Platform runtime started");
        let (forward_tx, forward_rx) = mpsc::channel::<PathBuf>(1);
        let forwarder = tokio::spawn(forward_photos(self.photo_handler.clone(), forward_rx));
        let mut backlog: VecDeque<PathBuf> = VecDeque::new();

        while !self.shutting_down {
            tokio::select! {
                Some(event) = self.event_rx.recv() => self.handle_event(event, &mut backlog),
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("Command channel closed");
                        self.shutting_down = true;
                    }
                },
                permit = forward_tx.reserve(), if !backlog.is_empty() => match permit {
                    Ok(permit) => {
                        if let Some(path) = backlog.pop_front() {
                            permit.send(path);
                        }
                    }
                    Err(_) => {
                        warn!(dropped = backlog.len(), "Photo forwarder ended");
                        backlog.clear();
                    }
                },
            }
        }

        self.stop_watcher().await;
        drop(forward_tx);
        forwarder.abort();
        if !backlog.is_empty() {
            debug!(dropped = backlog.len(), "Unforwarded photos discarded on shutdown");
        }
        info!("Platform runtime stopped");
    }

    fn handle_event(&self, event: PlatformEvent, backlog: &mut VecDeque<PathBuf>) {
        match event {
            PlatformEvent::NewPhoto { path } => enqueue_photo(backlog, path),
            PlatformEvent::WatcherStarted { capability } => {
                info!(mode = capability.as_str(), "Watcher running");
            }
            PlatformEvent::WatcherStopped => {
                debug!("Watcher stopped");
            }
            PlatformEvent::WatcherError { message } => {
                error!(error = %message, "Watcher error");
            }
        }
    }

    async fn handle_command(&mut self, command: PlatformCommand) {
        match command {
            PlatformCommand::StartWatcher { config, reply } => {
                debug!("StartWatcher command received");
                let result = self.start_watcher(config).await;
                respond(reply, result);
            }
            PlatformCommand::StopWatcher { reply } => {
                debug!("StopWatcher command received");
                self.stop_watcher().await;
                respond(reply, Ok(()));
            }
            PlatformCommand::ConfigUpdated { config, reply } => {
                debug!("ConfigUpdated command received");
                let result = match self.watcher.apply_config(config).await {
                    Ok(true) => {
                        self.after_start();
                        Ok(())
                    }
                    Ok(false) => Ok(()),
                    Err(err) => {
                        self.release_keep_running();
                        Err(err)
                    }
                };
                respond(reply, result);
            }
            PlatformCommand::Shutdown => {
                self.shutting_down = true;
                info!("Platform runtime shutting down");
            }
        }
    }

    async fn start_watcher(&mut self, config: WatchConfig) -> Result<(), WatcherError> {
        match self.watcher.start(config).await {
            Ok(_) => {
                self.after_start();
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Failed to start photo watcher");
                self.release_keep_running();
                Err(err)
            }
        }
    }

    fn after_start(&self) {
        if let Some(capability) = self.watcher.capability() {
            if let Err(err) = self
                .event_tx
                .try_send(PlatformEvent::WatcherStarted { capability })
            {
                debug!(error = %err, "Failed to emit watcher started event");
            }
        }
        if let Some(keep_running) = &self.keep_running {
            if !keep_running.is_held() {
                if let Err(err) = keep_running.acquire(KEEP_RUNNING_REASON) {
                    warn!(error = %format!("{err:#}"), "Failed to acquire keep-running capability");
                }
            }
        }
    }

    async fn stop_watcher(&mut self) {
        if self.watcher.stop().await {
            if let Err(err) = self.event_tx.try_send(PlatformEvent::WatcherStopped) {
                debug!(error = %err, "Failed to emit watcher stopped event");
            }
        }
        self.release_keep_running();
    }

    fn release_keep_running(&self) {
        if let Some(keep_running) = &self.keep_running {
            if keep_running.is_held() {
                keep_running.release();
            }
        }
    }
}

fn enqueue_photo(backlog: &mut VecDeque<PathBuf>, path: PathBuf) {
    if backlog.len() >= PHOTO_BACKLOG_LIMIT {
        warn!(path = %path.display(), "Photo backlog full, dropping new photo");
        return;
    }
    backlog.push_back(path);
}

/// Hand photos to `handler` one at a time, in arrival order.
async fn forward_photos(handler: Option<Arc<dyn NewPhotoHandler>>, mut photos: mpsc::Receiver<PathBuf>) {
    while let Some(path) = photos.recv().await {
        match &handler {
            Some(handler) => {
                if let Err(e) = handler.on_new_photo(path.clone()).await {
                    error!(path = %path.display(), error = %format!("{e:#}"), "Failed to handle new photo");
                }
            }
            None => warn!(path = %path.display(), "New photo detected but no handler registered"),
        }
    }
}

fn respond(reply: Option<WatcherReply>, result: Result<(), WatcherError>) {
    if let Some(reply) = reply {
        if reply.send(result).is_err() {
            debug!("Watcher command requester went away");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ProcessKeepRunning;
    use anyhow::Result;
    use sl_core::{AppConfig, WatchMode};
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};
    use tokio::time::timeout;

    struct ForwardingHandler {
        tx: mpsc::Sender<PathBuf>,
    }

    #[async_trait::async_trait]
    impl NewPhotoHandler for ForwardingHandler {
        async fn on_new_photo(&self, path: PathBuf) -> Result<()> {
            self.tx
                .send(path)
                .await
                .map_err(|err| anyhow::anyhow!("handler send failed: {err}"))
        }
    }

    struct StalledHandler;

    #[async_trait::async_trait]
    impl NewPhotoHandler for StalledHandler {
        async fn on_new_photo(&self, _path: PathBuf) -> Result<()> {
            std::future::pending().await
        }
    }

    fn log_config(dir: &Path) -> WatchConfig {
        let mut config = AppConfig::default().watch_config();
        config.photos_dir = dir.to_path_buf();
        config.logs_dir = dir.to_path_buf();
        config.mode = WatchMode::LogTail;
        config.poll_interval = Duration::from_millis(20);
        config
    }

    #[tokio::test]
    async fn new_photo_event_reaches_handler() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (command_tx, command_rx) = mpsc::channel(8);
        let (handler_tx, mut handler_rx) = mpsc::channel(1);
        let handler: Arc<dyn NewPhotoHandler> = Arc::new(ForwardingHandler { tx: handler_tx });

        let runtime = PlatformRuntime::new(event_tx.clone(), event_rx, command_rx, Some(handler));
        let task = tokio::spawn(runtime.start());

        event_tx
            .send(PlatformEvent::NewPhoto {
                path: PathBuf::from("/p/VRChat_a.png"),
            })
            .await
            .unwrap();
        let received = timeout(Duration::from_millis(500), handler_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, PathBuf::from("/p/VRChat_a.png"));

        command_tx.send(PlatformCommand::Shutdown).await.unwrap();
        timeout(Duration::from_millis(500), task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn start_failure_is_replied_and_keep_running_not_held() {
        let dir = tempfile::tempdir().unwrap();
        let (event_tx, event_rx) = mpsc::channel(8);
        let (_command_tx, command_rx) = mpsc::channel(8);
        let keep_running = Arc::new(ProcessKeepRunning::new());
        let mut runtime =
            PlatformRuntime::new(event_tx, event_rx, command_rx, None).with_keep_running(keep_running.clone());

        let (reply, rx) = oneshot::channel();
        runtime
            .handle_command(PlatformCommand::StartWatcher {
                config: log_config(&dir.path().join("missing")),
                reply: Some(reply),
            })
            .await;

        assert!(matches!(rx.await.unwrap(), Err(WatcherError::DirectoryUnavailable(_))));
        assert!(!keep_running.is_held());
    }

    #[tokio::test]
    async fn keep_running_follows_watcher_lifetime() {
        let dir = tempfile::tempdir().unwrap();
        let (event_tx, event_rx) = mpsc::channel(8);
        let (_command_tx, command_rx) = mpsc::channel(8);
        let keep_running = Arc::new(ProcessKeepRunning::new());
        let mut runtime =
            PlatformRuntime::new(event_tx, event_rx, command_rx, None).with_keep_running(keep_running.clone());

        runtime
            .handle_command(PlatformCommand::StartWatcher {
                config: log_config(dir.path()),
                reply: None,
            })
            .await;
        assert!(keep_running.is_held());

        runtime.handle_command(PlatformCommand::StopWatcher { reply: None }).await;
        assert!(!keep_running.is_held());
    }

    #[tokio::test]
    async fn commands_are_served_while_handler_is_stalled() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (command_tx, command_rx) = mpsc::channel(8);
        let handler: Arc<dyn NewPhotoHandler> = Arc::new(StalledHandler);
        let task = tokio::spawn(PlatformRuntime::new(event_tx.clone(), event_rx, command_rx, Some(handler)).start());

        for n in 0..3 {
            event_tx
                .send(PlatformEvent::NewPhoto {
                    path: PathBuf::from(format!("/p/VRChat_{n}.png")),
                })
                .await
                .unwrap();
        }

        let (reply, rx) = oneshot::channel();
        command_tx
            .send(PlatformCommand::StopWatcher { reply: Some(reply) })
            .await
            .unwrap();
        assert!(timeout(Duration::from_millis(500), rx).await.unwrap().unwrap().is_ok());

        command_tx.send(PlatformCommand::Shutdown).await.unwrap();
        timeout(Duration::from_millis(500), task).await.unwrap().unwrap();
    }

    #[test]
    fn backlog_is_bounded() {
        let mut backlog = VecDeque::new();
        for n in 0..PHOTO_BACKLOG_LIMIT + 5 {
            enqueue_photo(&mut backlog, PathBuf::from(format!("/p/{n}.png")));
        }
        assert_eq!(backlog.len(), PHOTO_BACKLOG_LIMIT);
        assert_eq!(backlog.front(), Some(&PathBuf::from("/p/0.png")));
    }
}
