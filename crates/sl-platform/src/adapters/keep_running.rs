use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use sl_core::ports::KeepRunningPort;
use tracing::info;

/// Keep-running capability for a process that is its own background
/// service: holding it only records that work is in progress.
#[derive(Debug, Default)]
pub struct ProcessKeepRunning {
    held: AtomicBool,
}

impl ProcessKeepRunning {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeepRunningPort for ProcessKeepRunning {
    fn acquire(&self, reason: &str) -> Result<()> {
        if !self.held.swap(true, Ordering::SeqCst) {
            info!(reason, "Keep-running acquired");
        }
        Ok(())
    }

    fn release(&self) {
        if self.held.swap(false, Ordering::SeqCst) {
            info!("Keep-running released");
        }
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}
