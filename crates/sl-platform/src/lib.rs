//! # sl-platform
//!
//! Platform-specific implementations for Snaplog.
//!
//! This crate owns everything that talks to the host: filesystem change
//! notifications, the session log poller, the background runtime thread and
//! the per-user application directories.

pub mod adapters;
pub mod app_dirs;
pub mod capability;
pub mod ipc;
pub mod runtime;
pub mod watcher;
