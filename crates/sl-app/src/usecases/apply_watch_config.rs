use std::sync::Arc;

use sl_core::ports::{WatcherControlError, WatcherControlPort};
use sl_core::{AppConfig, WatchConfig};
use tracing::{info, warn};

use crate::events::{PipelineEvent, PipelineEvents};

#[derive(Debug, thiserror::Error)]
pub enum ApplyWatchConfigError {
    #[error(transparent)]
    Control(#[from] WatcherControlError),
}

/// Hand a changed configuration snapshot to the watcher.
///
/// The background runtime decides whether the change needs a stop/start
/// cycle; this use case only skips the round trip when nothing the watcher
/// reads has changed.
pub struct ApplyWatchConfig {
    watcher_control: Arc<dyn WatcherControlPort>,
    events: PipelineEvents,
}

impl ApplyWatchConfig {
    pub fn new(watcher_control: Arc<dyn WatcherControlPort>, events: PipelineEvents) -> Self {
        Self {
            watcher_control,
            events,
        }
    }

    #[tracing::instrument(name = "usecase.apply_watch_config.execute", skip_all)]
    pub async fn execute(&self, previous: &AppConfig, next: &AppConfig) -> Result<bool, ApplyWatchConfigError> {
        let next_watch: WatchConfig = next.watch_config();
        if previous.watch_config() == next_watch {
            info!("Watch configuration unchanged");
            return Ok(false);
        }

        if let Err(err) = self.watcher_control.apply_config(next_watch).await {
            warn!(error = %err, "Watcher rejected the new configuration");
            self.events.emit(PipelineEvent::WatcherError {
                message: err.to_string(),
            });
            return Err(err.into());
        }
        info!("Watch configuration applied");
        Ok(true)
    }
}
