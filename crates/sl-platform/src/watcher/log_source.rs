use std::path::PathBuf;

use sl_core::{ScreenshotName, WatchConfig};
use sl_infra::session_log::LogTail;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::WatcherError;
use super::scan::is_candidate;
use super::state::WatchState;
use crate::ipc::PlatformEvent;
use crate::runtime::event_bus::{send_unless_cancelled, PlatformEventSender};

/// Poll ticks a logged screenshot may wait for its file to appear.
pub const MAX_PENDING_ATTEMPTS: u32 = 10;

#[derive(Debug)]
struct PendingPhoto {
    path: PathBuf,
    attempts: u32,
}

/// Screenshot detection from the producer's session log.
///
/// Log lines can race ahead of the file flush, so a referenced path that
/// does not exist yet is parked and re-checked on later ticks.
pub(super) struct LogSource {
    tail: LogTail,
    config: WatchConfig,
    state: WatchState,
    pending: Vec<PendingPhoto>,
}

impl LogSource {
    pub(super) fn new(tail: LogTail, config: WatchConfig, state: WatchState) -> Self {
        Self {
            tail,
            config,
            state,
            pending: Vec::new(),
        }
    }

    /// Read appended lines and return the paths to emit, in log order.
    pub(super) async fn poll_once(&mut self) -> Vec<PathBuf> {
        let lines = match self.tail.read_new_lines().await {
            Ok(lines) => lines,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "Failed to read session log");
                Vec::new()
            }
        };

        for line in lines {
            let Some(raw) = ScreenshotName::find_in_line(&line) else {
                continue;
            };
            let path = PathBuf::from(raw);
            if !is_candidate(&path, &self.config)
                || self.state.is_handled(&path)
                || self.pending.iter().any(|p| p.path == path)
            {
                continue;
            }
            self.pending.push(PendingPhoto { path, attempts: 0 });
        }

        let mut ready = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut photo in std::mem::take(&mut self.pending) {
            let exists = tokio::fs::metadata(&photo.path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if exists {
                if self.state.mark_handled(&photo.path) {
                    ready.push(photo.path);
                }
                continue;
            }
            photo.attempts += 1;
            if photo.attempts >= MAX_PENDING_ATTEMPTS {
                warn!(path = %photo.path.display(), "Logged screenshot never appeared on disk");
                continue;
            }
            still_pending.push(photo);
        }
        self.pending = still_pending;
        ready
    }

    pub(super) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Skip the existing log content and spawn the polling task.
pub(super) async fn spawn(
    config: WatchConfig,
    state: WatchState,
    events: PlatformEventSender,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>, WatcherError> {
    let mut tail = LogTail::new(config.logs_dir.clone());
    tail.seek_to_end()
        .await
        .map_err(|e| WatcherError::Subscribe {
            path: config.logs_dir.clone(),
            message: format!("{e:#}"),
        })?;
    debug!(
        log = ?tail.current_file(),
        "Following session log for screenshots"
    );

    let interval = config.poll_interval.max(std::time::Duration::from_millis(10));
    let mut source = LogSource::new(tail, config, state);

    Ok(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    for path in source.poll_once().await {
                        debug!(path = %path.display(), "New screenshot logged");
                        if !send_unless_cancelled(&events, &cancel, PlatformEvent::NewPhoto { path }).await {
                            debug!("Log poller cancelled or runtime gone");
                            return;
                        }
                    }
                }
            }
        }
    }))
}
