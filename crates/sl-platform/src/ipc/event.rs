// PlatformEvent only reports facts that already happened. It carries no
// instructions for the receiver and no backend detail (no notify internals).

use std::path::PathBuf;

use crate::capability::WatchCapability;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// A screenshot that was not present before the watcher started.
    NewPhoto { path: PathBuf },

    /// The watcher is subscribed and emitting.
    WatcherStarted { capability: WatchCapability },

    /// All subscriptions were released.
    WatcherStopped,

    /// The event backend reported a problem; the watcher keeps running.
    WatcherError { message: String },
}
