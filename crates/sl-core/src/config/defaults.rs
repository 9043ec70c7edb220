//! Documented fallback values for keys absent from the config file.

pub const WATCH_EXTENSIONS: &[&str] = &["png"];
pub const POLL_INTERVAL_MS: u64 = 1_000;
pub const THUMBNAIL_MAX_ENTRIES: usize = 256;
pub const THUMBNAIL_MAX_BYTES: usize = 64 * 1024 * 1024;
pub const THUMBNAIL_DEFAULT_SIZE: u32 = 256;
pub const UPLOAD_ENABLED: bool = false;
