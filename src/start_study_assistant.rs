//! Startup helpers for the study assistant server.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use crate::llm::GenerationClient;
use crate::server::{self, AppState};
use crate::session::{AssistantConfig, SessionEngine, SqliteKvStore};

/// Run the server until Ctrl-C (used by the `studydesk-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting study assistant v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e:#}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(serve(config)) {
        tracing::error!("Server error: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Read and validate configuration from the environment.
///
/// # Errors
/// Returns an error if a variable is malformed or a value is out of range.
pub fn load_config() -> anyhow::Result<AssistantConfig> {
    let config = AssistantConfig::from_env().context("failed to read configuration")?;
    config.validate().context("configuration rejected")?;
    tracing::info!(
        endpoint = %config.llm.endpoint,
        db = %config.storage.sqlite_path.display(),
        timer = ?config.timer.mode,
        "Configuration loaded"
    );
    Ok(config)
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if the store or the generation client cannot be built.
pub async fn initialize(config: &AssistantConfig) -> anyhow::Result<Arc<AppState>> {
    let store = SqliteKvStore::new(&config.storage)
        .await
        .with_context(|| format!("failed to open {}", config.storage.sqlite_path.display()))?;
    let client =
        GenerationClient::from_config(config).context("failed to build generation client")?;
    let engine = SessionEngine::open(config, Arc::new(client), Arc::new(store)).await;
    Ok(AppState::new(engine))
}

/// Initialize state and serve until Ctrl-C, then flush pending writes.
///
/// # Errors
/// Returns an error if initialization or the server fails.
pub async fn serve(config: AssistantConfig) -> anyhow::Result<()> {
    let state = initialize(&config).await?;
    let engine = state.engine.clone();

    server::run_server_with_shutdown(state, config.server.port, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    engine.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
