//! Platform capability detection for the change watcher.
//!
//! Decides whether native filesystem notifications can be trusted for the
//! photos directory or whether the watcher has to follow the session log.

use std::path::Path;

use sl_core::WatchMode;
use tracing::{info, warn};

/// How new screenshots are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCapability {
    /// Native create/modify notifications on the photos directory.
    NativeEvents,
    /// Screenshot lines in the producer's session log.
    LogTail,
}

impl WatchCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchCapability::NativeEvents => "events",
            WatchCapability::LogTail => "log_tail",
        }
    }
}

/// Resolve the configured mode into a concrete capability.
///
/// Explicit modes are honoured as-is; `Auto` probes the environment.
pub fn resolve_capability(mode: WatchMode, photos_dir: &Path) -> WatchCapability {
    match mode {
        WatchMode::Events => WatchCapability::NativeEvents,
        WatchMode::LogTail => WatchCapability::LogTail,
        WatchMode::Auto => detect_watch_capability(photos_dir),
    }
}

/// Detect the watch capability for `photos_dir`.
///
/// # Detection Logic
///
/// - **Linux under WSL** with the photos directory on a Windows drive
///   (`/mnt/<drive>/...`): `LogTail`, inotify does not see writes made from
///   the Windows side.
/// - **Everything else**: `NativeEvents`.
pub fn detect_watch_capability(photos_dir: &Path) -> WatchCapability {
    if is_wsl() && is_windows_mount(photos_dir) {
        warn!(
            path = %photos_dir.display(),
            "WSL mount detected, following the session log instead of filesystem events"
        );
        return WatchCapability::LogTail;
    }

    info!(path = %photos_dir.display(), "Using native filesystem events");
    WatchCapability::NativeEvents
}

/// Detect if running under WSL (Windows Subsystem for Linux).
///
/// Checks `/proc/version` for "Microsoft" or "WSL", then the WSL
/// environment variables.
fn is_wsl() -> bool {
    if !cfg!(target_os = "linux") {
        return false;
    }
    if let Ok(version) = std::fs::read_to_string("/proc/version") {
        if version.contains("Microsoft") || version.contains("WSL") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok() || std::env::var("WSL_INTEROP").is_ok()
}

fn is_windows_mount(path: &Path) -> bool {
    let mut components = path.components().map(|c| c.as_os_str().to_string_lossy());
    matches!(
        (components.next().as_deref(), components.next().as_deref(), components.next()),
        (Some("/"), Some("mnt"), Some(drive)) if drive.len() == 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_modes_win() {
        let dir = Path::new("/mnt/c/Users/me/Pictures/VRChat");
        assert_eq!(
            resolve_capability(WatchMode::Events, dir),
            WatchCapability::NativeEvents
        );
        assert_eq!(
            resolve_capability(WatchMode::LogTail, Path::new("/home/me")),
            WatchCapability::LogTail
        );
    }

    #[test]
    fn recognises_windows_drive_mounts() {
        assert!(is_windows_mount(Path::new("/mnt/c/Users/me")));
        assert!(!is_windows_mount(Path::new("/mnt/data/photos")));
        assert!(!is_windows_mount(Path::new("/home/me/mnt/c")));
    }

    #[test]
    fn local_dirs_use_native_events() {
        assert_eq!(
            detect_watch_capability(Path::new("/home/me/Pictures/VRChat")),
            WatchCapability::NativeEvents
        );
    }
}
