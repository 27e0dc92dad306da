use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use roster_sync::config::Config;
use roster_sync::store::{self, PgRosterStore};
use roster_sync::sync::{self, SyncContext};
use roster_sync::{graph, schedule};

/// Sync a Teams channel roster into Postgres and install an app for every member.
#[derive(Debug, Parser)]
#[command(name = "roster-sync", version)]
struct Cli {
    /// Run a single sync and exit instead of starting the scheduler.
    #[arg(long, env = "ROSTER_SYNC_ONCE")]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("ROSTER_SYNC_LOG").unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().json())
        .init();

    let cli = Cli::parse();
    let cfg = Config::load()?;
    tracing::info!(config = ?cfg, "configuration loaded");

    let pool = store::pool::connect(&cfg.database_url).await?;
    let http = graph::http_client(cfg.http_timeout)?;

    let ctx = SyncContext {
        config: Arc::new(cfg),
        http,
        store: PgRosterStore::new(pool),
    };

    if cli.once {
        let summary = sync::run_once(&ctx).await?;
        summary.log();
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(());
    let scheduler = tokio::spawn(schedule::run(ctx, shutdown_rx));

    shutdown_signal().await;
    let _ = shutdown_tx.send(());
    scheduler.await?;

    tracing::info!("roster-sync stopped");
    Ok(())
}

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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
