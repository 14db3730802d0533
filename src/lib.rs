pub mod background;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Config;
use crate::error::AppError;
use crate::infra::factory::bootstrap_state;
use crate::state::AppState;

pub fn init_logging(log_dir: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "ecotrack.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("info,ecotrack=debug"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized. Writing JSON logs to {}/", log_dir);
    guard
}

/// Reads the environment, connects storage and restores any saved session.
/// Keep the returned guard alive for as long as logs should be flushed.
pub async fn start() -> Result<(AppState, WorkerGuard), AppError> {
    let config = Config::from_env();
    let guard = init_logging(&config.log_dir);

    let state = bootstrap_state(&config).await?;
    let backend = if config.database_url.starts_with("postgres") { "postgres" } else { "sqlite" };
    info!(
        backend,
        timezone = %config.timezone,
        "EcoTrack core ready"
    );
    Ok((state, guard))
}
