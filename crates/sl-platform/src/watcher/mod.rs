//! ChangeWatcher: detects screenshots that appear after start-up.
//!
//! Two sources feed the same dedup state: native filesystem notifications on
//! the photos directory, or screenshot lines in the producer's session log.

mod error;
mod event_source;
mod log_source;
mod photo_watcher;
mod scan;
mod state;

pub use error::WatcherError;
pub use log_source::MAX_PENDING_ATTEMPTS;
pub use photo_watcher::PhotoWatcher;
pub use scan::{initial_scan, is_candidate};
pub use state::WatchState;
