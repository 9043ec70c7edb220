//! # Configuration Loader
//!
//! Reads the TOML file and maps it onto [`AppConfig`]. No validation happens
//! here; an empty photo directory is a fact the watcher reports on start.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use sl_core::app_dirs::AppDirs;
use sl_core::config::AppConfig;
use sl_platform::app_dirs::{default_logs_dir, default_photos_dir};
use tracing::info;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SNAPLOG_CONFIG";

/// Config file location: the CLI argument, then [`CONFIG_ENV`], then
/// `config.toml` in the app data root. Empty values are skipped.
pub fn resolve_config_path(
    cli_arg: Option<OsString>,
    env_value: Option<OsString>,
    dirs: &AppDirs,
) -> PathBuf {
    cli_arg
        .filter(|value| !value.is_empty())
        .or(env_value.filter(|value| !value.is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs.config_path())
}

/// Load configuration from a TOML file. A missing file yields defaults.
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %config_path.display(), "No config file, using defaults");
            return Ok(AppConfig::empty());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))
        }
    };
    AppConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Fill unset photo and log directories with the producer's default
/// locations on this machine.
pub fn with_default_paths(config: AppConfig) -> AppConfig {
    fill_paths(config, default_photos_dir(), default_logs_dir())
}

fn fill_paths(mut config: AppConfig, photos: Option<PathBuf>, logs: Option<PathBuf>) -> AppConfig {
    if config.paths.photos_dir.as_os_str().is_empty() {
        if let Some(photos) = photos {
            config.paths.photos_dir = photos;
        }
    }
    if config.paths.logs_dir.as_os_str().is_empty() {
        if let Some(logs) = logs {
            config.paths.logs_dir = logs;
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_core::WatchMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dirs() -> AppDirs {
        AppDirs {
            app_data_root: PathBuf::from("/data/snaplog"),
            app_cache_root: PathBuf::from("/cache/snaplog"),
        }
    }

    #[test]
    fn cli_argument_wins_over_environment() {
        let path = resolve_config_path(
            Some("/cli.toml".into()),
            Some("/env.toml".into()),
            &dirs(),
        );
        assert_eq!(path, PathBuf::from("/cli.toml"));
    }

    #[test]
    fn environment_then_data_root() {
        assert_eq!(
            resolve_config_path(None, Some("/env.toml".into()), &dirs()),
            PathBuf::from("/env.toml")
        );
        assert_eq!(
            resolve_config_path(Some("".into()), None, &dirs()),
            PathBuf::from("/data/snaplog/config.toml")
        );
    }

    #[test]
    fn reads_valid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [paths]
            photos_dir = "/photos"

            [upload]
            enabled = true

            [watcher]
            mode = "log"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.paths.photos_dir, PathBuf::from("/photos"));
        assert!(config.upload.enabled);
        assert_eq!(config.watcher.mode, WatchMode::LogTail);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[paths\nphotos_dir = ").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn configured_paths_are_kept() {
        let mut config = AppConfig::empty();
        config.paths.photos_dir = PathBuf::from("/mine");

        let filled = fill_paths(config, Some("/default/photos".into()), Some("/default/logs".into()));

        assert_eq!(filled.paths.photos_dir, PathBuf::from("/mine"));
        assert_eq!(filled.paths.logs_dir, PathBuf::from("/default/logs"));
    }
}
