use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::ipc::{PlatformCommand, PlatformEvent};

/// Capacity of the event channel between the watcher and the runtime loop.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
/// Capacity of the command channel into the runtime loop.
pub const COMMAND_CHANNEL_CAPACITY: usize = 16;

pub type PlatformEventSender = mpsc::Sender<PlatformEvent>;
pub type PlatformEventReceiver = mpsc::Receiver<PlatformEvent>;

pub type PlatformCommandSender = mpsc::Sender<PlatformCommand>;
pub type PlatformCommandReceiver = mpsc::Receiver<PlatformCommand>;

/// Send `event` unless `cancel` fires first.
///
/// Returns `false` when the event was not delivered, either because the
/// watcher was cancelled or because the runtime loop is gone.
pub async fn send_unless_cancelled(
    events: &PlatformEventSender,
    cancel: &CancellationToken,
    event: PlatformEvent,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = events.send(event) => sent.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn cancellation_unblocks_a_full_channel() {
        let (tx, _rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        tx.send(PlatformEvent::WatcherStopped).await.unwrap();

        let send = send_unless_cancelled(
            &tx,
            &cancel,
            PlatformEvent::NewPhoto {
                path: PathBuf::from("/p/a.png"),
            },
        );
        cancel.cancel();

        assert!(!timeout(Duration::from_millis(500), send).await.unwrap());
    }
}
