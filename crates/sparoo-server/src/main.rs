//! Sparoo Server — application entry point.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sparoo_db::DbManager;
use sparoo_provision::{KubeClusterClient, WorkloadCatalog};
use sparoo_server::{AppState, ServerConfig, router};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sparoo - managed database provisioning API
#[derive(Parser, Debug)]
#[command(name = "sparoo")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "sparoo.toml")]
    config: PathBuf,

    /// Listen address, overriding `[server] bind`
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "sparoo=info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!("Starting Sparoo server...");

    let mut config = ServerConfig::load_or_default(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let db = DbManager::connect(&config.database)
        .await
        .context("failed to connect to SurrealDB")?;
    sparoo_db::run_migrations(db.client())
        .await
        .context("failed to apply schema migrations")?;

    let cluster = KubeClusterClient::connect(&config.cluster)
        .await
        .context("failed to configure cluster client")?;
    let workloads =
        WorkloadCatalog::from_configs(&config.workloads).context("failed to load workloads")?;

    let state = AppState::new(
        db.client().clone(),
        cluster,
        workloads,
        config.provisioning.clone(),
        config.credentials.pepper.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!(address = %config.server.bind, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Sparoo server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
