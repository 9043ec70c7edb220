use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Paths already handled during one watcher lifecycle.
///
/// Process-lifetime only. A fresh state is built on every start.
#[derive(Debug, Clone, Default)]
pub struct WatchState {
    handled: HashSet<PathBuf>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`; `true` when it had not been handled before.
    pub fn mark_handled(&mut self, path: &Path) -> bool {
        if self.handled.contains(path) {
            return false;
        }
        self.handled.insert(path.to_path_buf())
    }

    pub fn is_handled(&self, path: &Path) -> bool {
        self.handled.contains(path)
    }

    pub fn len(&self) -> usize {
        self.handled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handled.is_empty()
    }
}
