use sl_core::WatchConfig;
use tokio::sync::oneshot;

use crate::watcher::WatcherError;

/// Outcome of a lifecycle command, sent back to the requester.
pub type WatcherReply = oneshot::Sender<Result<(), WatcherError>>;

/// Commands accepted by the platform runtime.
pub enum PlatformCommand {
    /// Start watching, tearing down any previous subscription first.
    StartWatcher {
        config: WatchConfig,
        reply: Option<WatcherReply>,
    },
    /// Release every subscription.
    StopWatcher { reply: Option<WatcherReply> },
    /// New configuration snapshot; restarts the watcher when its source changed.
    ConfigUpdated {
        config: WatchConfig,
        reply: Option<WatcherReply>,
    },
    /// Stop the watcher and leave the runtime loop.
    Shutdown,
}
