//! # Configuration DTOs
//!
//! Data only. `AppConfig::from_toml` maps the TOML document onto these
//! structures, substituting the constants in [`defaults`] for missing keys.
//! Paths are kept as written: an empty path is a valid fact that the
//! composition root resolves against the platform directories.

mod app_config;
pub mod defaults;

pub use app_config::{
    AppConfig, PathsConfig, ThumbnailSettings, UploadSettings, WatchConfig, WatchMode,
    WatcherSettings,
};
