use std::path::Path;

use sl_core::WatchConfig;
use tracing::debug;
use walkdir::WalkDir;

use super::state::WatchState;

/// Whether `path` has one of the watched extensions.
pub fn is_candidate(path: &Path, config: &WatchConfig) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| config.accepts_extension(ext))
}

/// Walk `root` recursively and mark every existing candidate as handled, so
/// only files created after start-up are emitted.
///
/// Unreadable entries are skipped.
pub fn initial_scan(root: &Path, config: &WatchConfig) -> WatchState {
    let mut state = WatchState::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "Skipping unreadable entry during initial scan");
                continue;
            }
        };
        if entry.file_type().is_file() && is_candidate(entry.path(), config) {
            state.mark_handled(entry.path());
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_core::AppConfig;

    fn config(root: &Path) -> WatchConfig {
        let mut config = AppConfig::default().watch_config();
        config.photos_dir = root.to_path_buf();
        config
    }

    #[test]
    fn marks_existing_files_in_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        let month = dir.path().join("2024-01");
        std::fs::create_dir_all(&month).unwrap();
        std::fs::write(dir.path().join("VRChat_a.png"), b"x").unwrap();
        std::fs::write(month.join("VRChat_b.PNG"), b"x").unwrap();
        std::fs::write(month.join("notes.txt"), b"x").unwrap();

        let state = initial_scan(dir.path(), &config(dir.path()));

        assert_eq!(state.len(), 2);
        assert!(state.is_handled(&month.join("VRChat_b.PNG")));
        assert!(!state.is_handled(&month.join("notes.txt")));
    }

    #[test]
    fn missing_root_yields_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        assert!(initial_scan(&gone, &config(&gone)).is_empty());
    }
}
