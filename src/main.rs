use sl_core::ports::AppDirsPort;
use sl_platform::app_dirs::DirsAppDirsAdapter;
use snaplog::bootstrap::{self, config};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dirs = DirsAppDirsAdapter::new().get_app_dirs()?;
    if let Err(err) = bootstrap::tracing::init_tracing_subscriber(&dirs.logs_dir()) {
        eprintln!("Failed to initialize tracing: {err:#}");
    }

    let config_path = config::resolve_config_path(
        std::env::args_os().nth(1),
        std::env::var_os(config::CONFIG_ENV),
        &dirs,
    );
    let config = config::with_default_paths(config::load_config(&config_path)?);
    info!(
        config = %config_path.display(),
        photos_dir = %config.paths.photos_dir.display(),
        logs_dir = %config.paths.logs_dir.display(),
        upload = config.upload.enabled,
        "Configuration loaded"
    );

    let dirs = match &config.paths.data_dir {
        Some(base) => DirsAppDirsAdapter::with_base_dir(base.clone()).get_app_dirs()?,
        None => dirs,
    };

    bootstrap::run_app(config, dirs).await
}
