//! # Platform Adapters
//!
//! Port implementations backed by the platform runtime.
//!
//! - `in_memory_watcher_control` - watcher lifecycle over the command channel
//! - `keep_running` - process-level keep-running flag
//! - `photo_forwarder` - hands new photos to another execution context

pub mod in_memory_watcher_control;
pub mod keep_running;
pub mod photo_forwarder;

pub use in_memory_watcher_control::InMemoryWatcherControl;
pub use keep_running::ProcessKeepRunning;
pub use photo_forwarder::ChannelPhotoForwarder;
