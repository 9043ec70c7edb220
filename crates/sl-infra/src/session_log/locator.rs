use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use sl_core::photo::SessionMetadata;
use sl_core::ports::SessionContextPort;

use super::parser::parse_session;

/// File name prefix of the producer's session logs.
pub const LOG_FILE_PREFIX: &str = "output_log";

/// Newest file in `dir` whose name starts with [`LOG_FILE_PREFIX`].
///
/// `Ok(None)` when the directory holds no log; an unreadable directory is an error.
pub async fn newest_log_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("read log directory {}", dir.display()))?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let path = entry.path();
        let is_newer = match &newest {
            Some((best, best_path)) => modified > *best || (modified == *best && path > *best_path),
            None => true,
        };
        if is_newer {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Session context read from the newest log in a directory.
pub struct LogSessionSource {
    logs_dir: PathBuf,
}

impl LogSessionSource {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    async fn read_session(&self) -> Result<SessionMetadata> {
        let Some(path) = newest_log_file(&self.logs_dir).await? else {
            debug!(dir = %self.logs_dir.display(), "No session log present");
            return Ok(SessionMetadata::empty());
        };
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read session log {}", path.display()))?;

        let session = tokio::task::spawn_blocking(move || {
            parse_session(&String::from_utf8_lossy(&bytes))
        })
        .await
        .context("session log worker")?;
        Ok(session)
    }
}

#[async_trait]
impl SessionContextPort for LogSessionSource {
    async fn current_session(&self) -> SessionMetadata {
        match self.read_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "Session log unavailable, continuing without session context");
                SessionMetadata::empty()
            }
        }
    }
}
