//! Process lifecycle: start watching, ingest what the watcher reports, stop
//! on ctrl-c.

use sl_app::{PipelineEvent, PipelineEvents};
use sl_core::app_dirs::AppDirs;
use sl_core::config::AppConfig;
use tracing::{error, info, warn};

use super::runtime::AppRuntime;
use super::wiring::{wire_dependencies, WiredDependencies};

pub const PIPELINE_EVENT_CAPACITY: usize = 128;

fn log_pipeline_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::Processed { record } => {
            info!(key = %record.key(), players = record.players.len(), "Photo processed");
        }
        PipelineEvent::Uploaded { record, url } => {
            info!(key = %record.key(), url = %url, "Photo uploaded");
        }
        PipelineEvent::Rejected { path, reason } => {
            warn!(path = %path.display(), reason = %reason, "Photo rejected");
        }
        PipelineEvent::UploadFailed { path, reason, class } => {
            warn!(path = %path.display(), reason = %reason, class = %class, "Photo upload failed");
        }
        PipelineEvent::WatcherError { message } => {
            error!(message = %message, "Watcher error");
        }
    }
}

pub async fn run_app(config: AppConfig, dirs: AppDirs) -> anyhow::Result<()> {
    let WiredDependencies {
        deps,
        host,
        mut new_photos,
    } = wire_dependencies(&config, &dirs)?;
    let (events, mut pipeline_events) = PipelineEvents::channel(PIPELINE_EVENT_CAPACITY);
    let runtime = AppRuntime::new(deps, config, events);
    let usecases = runtime.usecases();
    let ingest = usecases.ingest_photo();

    // A watcher that cannot start is reported; the process keeps running so
    // a corrected config can be applied later.
    if let Err(err) = usecases
        .start_photo_watcher()
        .execute(runtime.config().watch_config())
        .await
    {
        warn!(error = %err, "Continuing without an active watcher");
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            result = &mut shutdown => {
                if let Err(err) = result {
                    error!(error = %err, "Failed to listen for ctrl-c");
                }
                info!("Shutdown requested");
                break;
            }
            Some(path) = new_photos.recv() => {
                if let Err(err) = ingest.execute(&path).await {
                    warn!(path = %path.display(), error = %format!("{err:#}"), "Photo ingest failed");
                }
            }
            Some(event) = pipeline_events.recv() => log_pipeline_event(&event),
            else => break,
        }
    }

    // Release the background forwarder before asking the watcher to stop.
    new_photos.close();
    let mut unprocessed = 0usize;
    while new_photos.try_recv().is_ok() {
        unprocessed += 1;
    }
    if unprocessed > 0 {
        info!(unprocessed, "Photos left for the next start-up scan");
    }

    if let Err(err) = usecases.stop_photo_watcher().execute().await {
        warn!(error = %err, "Failed to stop watcher cleanly");
    }
    host.shutdown().await?;

    while let Ok(event) = pipeline_events.try_recv() {
        log_pipeline_event(&event);
    }
    let stats = usecases.get_thumbnail().stats();
    info!(
        entries = stats.entries,
        bytes = stats.bytes,
        hits = stats.hits,
        misses = stats.misses,
        "Snaplog stopped"
    );
    Ok(())
}
