use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use super::locator::newest_log_file;

/// Incremental reader over the newest session log in a directory.
///
/// Each call to [`LogTail::read_new_lines`] returns the complete lines appended
/// since the previous call. A newer log file or a file shorter than the stored
/// offset restarts reading from the beginning of the file.
pub struct LogTail {
    dir: PathBuf,
    current: Option<PathBuf>,
    offset: u64,
    partial: Vec<u8>,
}

impl LogTail {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: None,
            offset: 0,
            partial: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Skip everything already written to the newest log.
    pub async fn seek_to_end(&mut self) -> Result<()> {
        self.current = newest_log_file(&self.dir).await?;
        self.partial.clear();
        self.offset = match &self.current {
            Some(path) => tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0),
            None => 0,
        };
        Ok(())
    }

    pub async fn read_new_lines(&mut self) -> Result<Vec<String>> {
        let Some(newest) = newest_log_file(&self.dir).await? else {
            return Ok(Vec::new());
        };

        if self.current.as_ref() != Some(&newest) {
            debug!(path = %newest.display(), "Following new session log");
            self.current = Some(newest.clone());
            self.offset = 0;
            self.partial.clear();
        }

        let len = tokio::fs::metadata(&newest)
            .await
            .with_context(|| format!("stat {}", newest.display()))?
            .len();
        if len < self.offset {
            debug!(path = %newest.display(), "Session log truncated, rereading");
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let mut file = tokio::fs::File::open(&newest)
            .await
            .with_context(|| format!("open {}", newest.display()))?;
        file.seek(SeekFrom::Start(self.offset)).await?;
        let mut appended = Vec::new();
        file.take(len - self.offset).read_to_end(&mut appended).await?;
        self.offset += appended.len() as u64;

        self.partial.extend_from_slice(&appended);
        let Some(last_newline) = self.partial.iter().rposition(|&b| b == b'\n') else {
            return Ok(Vec::new());
        };
        let complete: Vec<u8> = self.partial.drain(..=last_newline).collect();

        Ok(String::from_utf8_lossy(&complete)
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn append(path: &Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn returns_only_appended_complete_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("output_log_a.txt");
        append(&log, "history\n");

        let mut tail = LogTail::new(dir.path());
        tail.seek_to_end().await.unwrap();
        assert!(tail.read_new_lines().await.unwrap().is_empty());

        append(&log, "first\r\nsecond\npart");
        assert_eq!(tail.read_new_lines().await.unwrap(), vec!["first", "second"]);

        append(&log, "ial\n");
        assert_eq!(tail.read_new_lines().await.unwrap(), vec!["partial"]);
    }

    #[tokio::test]
    async fn truncation_restarts_from_beginning() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("output_log_a.txt");
        append(&log, "one\ntwo\nthree\n");

        let mut tail = LogTail::new(dir.path());
        assert_eq!(tail.read_new_lines().await.unwrap().len(), 3);

        std::fs::write(&log, "fresh\n").unwrap();
        assert_eq!(tail.read_new_lines().await.unwrap(), vec!["fresh"]);
    }

    #[tokio::test]
    async fn newer_log_file_is_followed() {
        let dir = tempfile::tempdir().unwrap();
        append(&dir.path().join("output_log_a.txt"), "old\n");

        let mut tail = LogTail::new(dir.path());
        tail.seek_to_end().await.unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        append(&dir.path().join("output_log_b.txt"), "new session\n");

        assert_eq!(tail.read_new_lines().await.unwrap(), vec!["new session"]);
        assert!(tail.current_file().unwrap().ends_with("output_log_b.txt"));
    }

    #[tokio::test]
    async fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut tail = LogTail::new(dir.path());
        assert!(tail.read_new_lines().await.unwrap().is_empty());
    }
}
