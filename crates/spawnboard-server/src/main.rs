//! Spawnboard server binary.
//!
//! Wires the configuration, the timer store, the board refresh loop and
//! the dashboard API together, then serves until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `spawnboard-config.yaml`
//! 2. Initialize structured logging (tracing) from the `logging` section
//! 3. Open the timer store (`PostgreSQL` with migrations, or in-memory)
//! 4. Build the shared application state
//! 5. Spawn the board refresh loop
//! 6. Serve HTTP until `Ctrl-C`
//! 7. Stop the refresh loop and close the database pool

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use spawnboard_api::{AppState, ServerConfig};
use spawnboard_core::config::{DashboardConfig, LogFormat, LoggingConfig, StorageBackend};
use spawnboard_core::{InMemoryTimerStore, TimerStore};
use spawnboard_db::{PostgresConfig, PostgresPool};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "spawnboard-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so report afterwards.
    let config_path = Path::new(CONFIG_PATH);
    let config_found = config_path.exists();
    let config = if config_found {
        DashboardConfig::load(config_path)?
    } else {
        let mut config = DashboardConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        config
    };

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("spawnboard-server starting");
    if config_found {
        info!(path = CONFIG_PATH, "Configuration loaded");
    } else {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        storage = ?config.infrastructure.storage,
        resources = config.resources.len(),
        refresh_interval_ms = config.board.refresh_interval_ms,
        port = config.server.port,
        "Configuration ready"
    );

    // 3. Open the timer store.
    let (store, pool) = open_store(&config).await?;

    // 4. Shared state.
    let state = Arc::new(AppState::new(store, config.resources.clone()));

    // 5. Board refresh loop.
    let refresh = spawnboard_api::spawn_refresh_loop(
        Arc::clone(&state),
        Duration::from_millis(config.board.refresh_interval_ms),
    );

    // 6. Serve until Ctrl-C.
    let server_config = ServerConfig::from(&config.server);
    let served = spawnboard_api::start_server(&server_config, state, shutdown_signal()).await;

    // 7. Tear down.
    refresh.abort();
    if let Some(pool) = pool {
        pool.close().await;
    }
    served.map_err(AppError::from)?;

    info!("spawnboard-server shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    match logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Open the configured timer store.
///
/// Returns the pool alongside the store when `PostgreSQL` is used so it
/// can be closed on shutdown.
async fn open_store(
    config: &DashboardConfig,
) -> Result<(Arc<dyn TimerStore>, Option<PostgresPool>), AppError> {
    match config.infrastructure.storage {
        StorageBackend::Postgres => {
            let pg_config = PostgresConfig::from_infrastructure(&config.infrastructure);
            let pool = PostgresPool::connect(&pg_config).await?;
            pool.run_migrations().await?;
            let store: Arc<dyn TimerStore> = Arc::new(pool.timer_store());
            info!("Using PostgreSQL timer store");
            Ok((store, Some(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory timer store, timers are lost on restart");
            Ok((Arc::new(InMemoryTimerStore::new()), None))
        }
    }
}

/// Resolve once `Ctrl-C` is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
