use std::path::{Path, PathBuf};

use notify::RecommendedWatcher;
use sl_core::{WatchConfig, WatchMode};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::error::WatcherError;
use super::scan::initial_scan;
use super::state::WatchState;
use super::{event_source, log_source};
use crate::capability::{resolve_capability, WatchCapability};
use crate::runtime::event_bus::PlatformEventSender;

type NativeSubscribe = fn(
    &Path,
    WatchConfig,
    WatchState,
    PlatformEventSender,
    CancellationToken,
) -> Result<(RecommendedWatcher, JoinHandle<()>), WatcherError>;

struct ActiveWatch {
    config: WatchConfig,
    capability: WatchCapability,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    subscription: Option<RecommendedWatcher>,
}

/// Lifecycle owner of the screenshot watcher.
///
/// New screenshots are sent as [`crate::ipc::PlatformEvent::NewPhoto`] on the
/// event channel handed to [`PhotoWatcher::new`]. A path is emitted at most
/// once per `start`/`stop` cycle.
pub struct PhotoWatcher {
    events: PlatformEventSender,
    active: Option<ActiveWatch>,
    subscribe_native: NativeSubscribe,
}

impl PhotoWatcher {
    pub fn new(events: PlatformEventSender) -> Self {
        Self {
            events,
            active: None,
            subscribe_native: event_source::spawn,
        }
    }

    #[cfg(test)]
    fn with_native_subscribe(mut self, subscribe: NativeSubscribe) -> Self {
        self.subscribe_native = subscribe;
        self
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn config(&self) -> Option<&WatchConfig> {
        self.active.as_ref().map(|a| &a.config)
    }

    pub fn capability(&self) -> Option<WatchCapability> {
        self.active.as_ref().map(|a| a.capability)
    }

    /// Tear down any running subscription, scan the photos directory and
    /// subscribe again.
    ///
    /// A missing photos directory (or, in log mode, logs directory) leaves
    /// the watcher stopped and returns `DirectoryUnavailable`. In `Auto`
    /// mode a failed native subscription falls back to the session log.
    pub async fn start(&mut self, config: WatchConfig) -> Result<WatchCapability, WatcherError> {
        self.stop().await;
        if self.events.is_closed() {
            return Err(WatcherError::AlreadyStopped);
        }

        let root = config.photos_dir.clone();
        ensure_dir(&root).await?;
        let mut capability = resolve_capability(config.mode, &root);
        if capability == WatchCapability::LogTail {
            ensure_dir(&config.logs_dir).await?;
        }

        let scan_root = root.clone();
        let scan_config = config.clone();
        let state = tokio::task::spawn_blocking(move || initial_scan(&scan_root, &scan_config))
            .await
            .map_err(|e| WatcherError::Subscribe {
                path: root.clone(),
                message: e.to_string(),
            })?;
        info!(
            path = %root.display(),
            existing = state.len(),
            "Initial photo scan complete"
        );

        let cancel = CancellationToken::new();
        let (task, subscription) = match capability {
            WatchCapability::NativeEvents => {
                match (self.subscribe_native)(&root, config.clone(), state.clone(), self.events.clone(), cancel.clone()) {
                    Ok((watcher, task)) => (task, Some(watcher)),
                    Err(err) if config.mode == WatchMode::Auto => {
                        warn!(error = %err, "Native file events unavailable, following the session log instead");
                        ensure_dir(&config.logs_dir).await?;
                        capability = WatchCapability::LogTail;
                        let task = log_source::spawn(config.clone(), state, self.events.clone(), cancel.clone()).await?;
                        (task, None)
                    }
                    Err(err) => return Err(err),
                }
            }
            WatchCapability::LogTail => {
                let task = log_source::spawn(config.clone(), state, self.events.clone(), cancel.clone()).await?;
                (task, None)
            }
        };

        info!(
            path = %root.display(),
            mode = capability.as_str(),
            "Photo watcher started"
        );
        self.active = Some(ActiveWatch {
            config,
            capability,
            cancel,
            task,
            subscription,
        });
        Ok(capability)
    }

    /// Release every subscription. Returns whether a watcher was running.
    pub async fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };

        drop(active.subscription);
        active.cancel.cancel();
        if let Err(err) = active.task.await {
            if !err.is_cancelled() {
                warn!(error = %err, "Photo watcher task ended abnormally");
            }
        }
        info!("Photo watcher stopped");
        true
    }

    /// Apply a new configuration snapshot.
    ///
    /// A change of source (directories, mode, extensions, poll interval)
    /// costs a full stop/start. Returns whether a restart happened; a stopped
    /// watcher stays stopped.
    pub async fn apply_config(&mut self, config: WatchConfig) -> Result<bool, WatcherError> {
        let Some(active) = &self.active else {
            return Ok(false);
        };
        if !active.config.requires_restart(&config) && active.config.poll_interval == config.poll_interval {
            return Ok(false);
        }
        info!("Watch configuration changed, restarting photo watcher");
        self.start(config).await.map(|_| true)
    }
}

async fn ensure_dir(path: &Path) -> Result<(), WatcherError> {
    let unavailable = || WatcherError::DirectoryUnavailable(PathBuf::from(path));
    if path.as_os_str().is_empty() {
        return Err(unavailable());
    }
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        _ => Err(unavailable()),
    }
}
