//! Signal Relay server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use signal_relay::adapters::{app_router, AppState, TelegramIdentityResolver};
use signal_relay::application::{LivenessMonitor, LivenessMonitorConfig};
use signal_relay::config::{AppConfig, ConfigError, ServerConfig, ValidationError};
use signal_relay::domain::relay::RelayController;

/// Errors that abort startup.
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server)?;
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return Err(e.into());
    }

    let relay = Arc::new(RelayController::new());
    let identity = Arc::new(TelegramIdentityResolver::from_config(&config.identity)?);
    if !identity.verifies() {
        tracing::warn!("no bot token configured, init data will be reported unverified");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = LivenessMonitor::with_config(
        relay.clone(),
        LivenessMonitorConfig::default().with_interval(config.relay.liveness_interval()),
    );
    let monitor_task = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    let app = app_router(
        AppState {
            relay: relay.clone(),
            identity,
            relay_config: config.relay.clone(),
        },
        &config.server,
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        static_dir = ?config.server.static_dir,
        "signal relay listening"
    );

    let drain = {
        let relay = relay.clone();
        async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
            let dropped = relay.shutdown().await;
            tracing::info!(dropped, "relay drained");
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(drain)
        .await
        .map_err(StartupError::Serve)?;

    if let Err(e) = monitor_task.await {
        tracing::warn!(error = %e, "liveness monitor task failed");
    }
    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .map_err(|e| StartupError::Logging(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if server.is_production() {
        registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    result.map_err(|e| StartupError::Logging(e.to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
