use anyhow::Result;

/// Host capability that keeps the process alive while the interactive
/// context is suspended (a foreground service, a wake lock, a daemon).
///
/// The background watcher holds it for as long as it runs.
pub trait KeepRunningPort: Send + Sync {
    fn acquire(&self, reason: &str) -> Result<()>;

    fn release(&self);

    fn is_held(&self) -> bool;
}
