use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// How new screenshots are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchMode {
    /// Native filesystem events when available, log tailing otherwise.
    #[default]
    Auto,
    Events,
    LogTail,
}

impl FromStr for WatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(WatchMode::Auto),
            "events" | "event" => Ok(WatchMode::Events),
            "log" | "log_tail" | "log-tail" => Ok(WatchMode::LogTail),
            other => Err(format!("unknown watch mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    pub photos_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Overrides the platform data directory when set.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub enabled: bool,
    pub outbox_dir: Option<PathBuf>,
    pub user_id: String,
    pub auth_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherSettings {
    pub mode: WatchMode,
    pub extensions: Vec<String>,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailSettings {
    pub max_entries: usize,
    pub max_bytes: usize,
    pub default_size: u32,
}

/// Application configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub upload: UploadSettings,
    pub watcher: WatcherSettings,
    pub thumbnails: ThumbnailSettings,
}

/// Everything the change watcher needs for one `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub photos_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub mode: WatchMode,
    pub extensions: Vec<String>,
    pub poll_interval: Duration,
}

impl WatchConfig {
    /// Case-insensitive extension filter.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }

    /// Whether switching from `self` to `next` needs a stop/start cycle.
    pub fn requires_restart(&self, next: &WatchConfig) -> bool {
        self.photos_dir != next.photos_dir
            || self.logs_dir != next.logs_dir
            || self.mode != next.mode
            || self.extensions != next.extensions
    }
}

fn str_at<'a>(value: &'a toml::Value, section: &str, key: &str) -> Option<&'a str> {
    value.get(section)?.get(key)?.as_str()
}

fn int_at(value: &toml::Value, section: &str, key: &str) -> Option<i64> {
    value.get(section)?.get(key)?.as_integer()
}

fn bool_at(value: &toml::Value, section: &str, key: &str) -> Option<bool> {
    value.get(section)?.get(key)?.as_bool()
}

impl AppConfig {
    /// Map a parsed TOML document onto the DTO.
    ///
    /// Missing keys take the values in [`defaults`]. No validation happens
    /// here; only a `watcher.mode` string outside the known set is an error.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let mode = match str_at(toml_value, "watcher", "mode") {
            Some(raw) => raw.parse::<WatchMode>().map_err(anyhow::Error::msg)?,
            None => WatchMode::default(),
        };

        let extensions = toml_value
            .get("watcher")
            .and_then(|w| w.get("extensions"))
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| s.trim_start_matches('.').to_string())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|| defaults::WATCH_EXTENSIONS.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            paths: PathsConfig {
                photos_dir: PathBuf::from(str_at(toml_value, "paths", "photos_dir").unwrap_or("")),
                logs_dir: PathBuf::from(str_at(toml_value, "paths", "logs_dir").unwrap_or("")),
                data_dir: str_at(toml_value, "paths", "data_dir")
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from),
            },
            upload: UploadSettings {
                enabled: bool_at(toml_value, "upload", "enabled").unwrap_or(defaults::UPLOAD_ENABLED),
                outbox_dir: str_at(toml_value, "upload", "outbox_dir")
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from),
                user_id: str_at(toml_value, "upload", "user_id").unwrap_or("").to_string(),
                auth_token: str_at(toml_value, "upload", "auth_token").unwrap_or("").to_string(),
            },
            watcher: WatcherSettings {
                mode,
                extensions,
                poll_interval_ms: int_at(toml_value, "watcher", "poll_interval_ms")
                    .map(|v| v.max(0) as u64)
                    .unwrap_or(defaults::POLL_INTERVAL_MS),
            },
            thumbnails: ThumbnailSettings {
                max_entries: int_at(toml_value, "thumbnails", "max_entries")
                    .map(|v| v.max(0) as usize)
                    .unwrap_or(defaults::THUMBNAIL_MAX_ENTRIES),
                max_bytes: int_at(toml_value, "thumbnails", "max_bytes")
                    .map(|v| v.max(0) as usize)
                    .unwrap_or(defaults::THUMBNAIL_MAX_BYTES),
                default_size: int_at(toml_value, "thumbnails", "default_size")
                    .map(|v| v.clamp(0, u32::MAX as i64) as u32)
                    .unwrap_or(defaults::THUMBNAIL_DEFAULT_SIZE),
            },
        })
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let value: toml::Value = toml::from_str(raw)?;
        Self::from_toml(&value)
    }

    /// Configuration with every key at its default value.
    pub fn empty() -> Self {
        Self {
            paths: PathsConfig {
                photos_dir: PathBuf::new(),
                logs_dir: PathBuf::new(),
                data_dir: None,
            },
            upload: UploadSettings {
                enabled: defaults::UPLOAD_ENABLED,
                outbox_dir: None,
                user_id: String::new(),
                auth_token: String::new(),
            },
            watcher: WatcherSettings {
                mode: WatchMode::default(),
                extensions: defaults::WATCH_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
                poll_interval_ms: defaults::POLL_INTERVAL_MS,
            },
            thumbnails: ThumbnailSettings {
                max_entries: defaults::THUMBNAIL_MAX_ENTRIES,
                max_bytes: defaults::THUMBNAIL_MAX_BYTES,
                default_size: defaults::THUMBNAIL_DEFAULT_SIZE,
            },
        }
    }

    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            photos_dir: self.paths.photos_dir.clone(),
            logs_dir: self.paths.logs_dir.clone(),
            mode: self.watcher.mode,
            extensions: self.watcher.extensions.clone(),
            poll_interval: Duration::from_millis(self.watcher.poll_interval_ms),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::empty()
    }
}
