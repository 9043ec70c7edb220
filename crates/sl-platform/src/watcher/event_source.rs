use std::path::Path;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sl_core::WatchConfig;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::error::WatcherError;
use super::scan::is_candidate;
use super::state::WatchState;
use crate::ipc::PlatformEvent;
use crate::runtime::event_bus::{send_unless_cancelled, PlatformEventSender};

const RAW_CHANNEL_CAPACITY: usize = 256;

/// Subscribe to create/modify notifications under `root` (recursively) and
/// spawn the task that filters, dedups and emits them.
///
/// Dropping the returned watcher releases the OS subscription.
pub(super) fn spawn(
    root: &Path,
    config: WatchConfig,
    mut state: WatchState,
    events: PlatformEventSender,
    cancel: CancellationToken,
) -> Result<(RecommendedWatcher, JoinHandle<()>), WatcherError> {
    // notify calls back on its own thread; blocking_send is fine there.
    let (raw_tx, mut raw_rx) = mpsc::channel::<notify::Result<Event>>(RAW_CHANNEL_CAPACITY);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Err(err) = raw_tx.blocking_send(res) {
            debug!(error = %err, "Dropping file event after watcher shutdown");
        }
    })
    .map_err(|e| WatcherError::Subscribe {
        path: root.to_path_buf(),
        message: e.to_string(),
    })?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| WatcherError::Subscribe {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                received = raw_rx.recv() => {
                    let Some(res) = received else { break };
                    let event = match res {
                        Ok(event) => event,
                        Err(err) => {
                            error!(error = %err, "File watcher error");
                            let message = err.to_string();
                            if !send_unless_cancelled(&events, &cancel, PlatformEvent::WatcherError { message }).await {
                                break;
                            }
                            continue;
                        }
                    };
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        continue;
                    }
                    for path in event.paths {
                        if !is_candidate(&path, &config) || state.is_handled(&path) {
                            continue;
                        }
                        let is_file = tokio::fs::metadata(&path)
                            .await
                            .map(|m| m.is_file())
                            .unwrap_or(false);
                        if !is_file || !state.mark_handled(&path) {
                            continue;
                        }
                        debug!(path = %path.display(), "New screenshot detected");
                        if !send_unless_cancelled(&events, &cancel, PlatformEvent::NewPhoto { path }).await {
                            debug!("File event task cancelled or runtime gone");
                            return;
                        }
                    }
                }
            }
        }
    });

    Ok((watcher, task))
}
