use std::path::PathBuf;

/// Resolved per-user application directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub app_data_root: PathBuf,
    pub app_cache_root: PathBuf,
}

impl AppDirs {
    pub fn config_path(&self) -> PathBuf {
        self.app_data_root.join("config.toml")
    }

    pub fn database_path(&self) -> PathBuf {
        self.app_data_root.join("snaplog.db")
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.app_cache_root.join("thumbnails")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.app_data_root.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_stay_under_roots() {
        let dirs = AppDirs {
            app_data_root: PathBuf::from("/tmp/snaplog"),
            app_cache_root: PathBuf::from("/tmp/snaplog-cache"),
        };
        assert!(dirs.database_path().starts_with("/tmp/snaplog"));
        assert!(dirs.thumbnails_dir().starts_with("/tmp/snaplog-cache"));
        assert!(dirs.config_path().ends_with("config.toml"));
    }
}
