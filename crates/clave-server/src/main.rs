use std::sync::Arc;

use clave_core::db;
use clave_core::models::ScheduleConfig;
use clave_core::repository::SqliteRepository;
use clave_server::{create_router, AppState, ServerConfig};
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Listens for SIGINT (Ctrl+C) and SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::new()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database_path,
        "starting clave server"
    );

    let pool = db::establish_connection(&config.database_path).await?;
    let repo = SqliteRepository::new(
        pool.clone(),
        ScheduleConfig {
            lookahead_weeks: config.lookahead_weeks,
        },
    );

    let app = create_router(AppState {
        repo: Arc::new(repo),
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("server shutdown complete");
    Ok(())
}
