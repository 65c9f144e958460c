//! Runtime wiring and server startup for playrec.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use playrec_api::{ApiServer, AppState};
use playrec_config::Config;
use playrec_protocols::KeyValueStore;
use playrec_runtime::{
    FileKvStore, FileSessionStore, LlmCodeGenerator, Recorder, RecorderOptions,
    RestoreCoordinator, RestorePolicy, SurfaceRegistry,
};

/// Initialize tracing with console and file output.
///
/// Log files are written to `log_dir` with daily rotation.
pub(crate) fn init_tracing(log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("playrec")
        .filename_suffix("log")
        .max_log_files(14)
        .build(log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The worker flushes on drop, so it has to live as long as the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Build the recorder over the file-backed stores named in `config`.
pub(crate) fn build_recorder(config: &Config) -> Arc<Recorder> {
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(config.storage.settings_path()));
    let sessions = Arc::new(FileSessionStore::with_limit(
        config.storage.sessions_path(),
        config.storage.history_limit,
    ));
    let generator =
        Arc::new(LlmCodeGenerator::new(config.provider.clone()).with_settings_store(kv.clone()));
    let surfaces = Arc::new(SurfaceRegistry::new());

    Arc::new(
        Recorder::new(generator, sessions, kv, surfaces)
            .with_options(RecorderOptions::from(&config.recording)),
    )
}

/// Run the server in foreground.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting playrec v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", config.storage.data_path().display());
    info!(
        "Provider: {} ({})",
        config.provider.provider, config.provider.model_name
    );

    let recorder = build_recorder(&config);
    let coordinator = Arc::new(RestoreCoordinator::new(
        recorder.clone(),
        RestorePolicy::from(&config.restore),
    ));
    let state = Arc::new(
        AppState::new(recorder, coordinator)
            .with_default_settings(config.recording.session_settings()),
    );

    ApiServer::new(config.server.clone(), state).run().await?;

    info!("playrec stopped");
    Ok(())
}
