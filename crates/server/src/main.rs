//! Arena server binary.
//!
//! Composition root: loads configuration and the creature roster, starts the
//! arena runtime (battle service plus inactivity sweeper) and serves the HTTP
//! API until Ctrl-C.
//!
//! ```bash
//! ARENA_ROSTER_PATH=crates/server/data/roster.ron cargo run -p arena-server
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use arena_runtime::{ArenaRuntime, InMemoryRoster};
use arena_server::{ServerConfig, logging, router};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    let _log_guard = logging::init(config.log_dir.as_deref()).context("failed to set up logging")?;

    let roster = InMemoryRoster::load_ron(&config.roster_path)
        .with_context(|| format!("failed to load roster {}", config.roster_path.display()))?;

    let runtime = ArenaRuntime::builder()
        .config(config.runtime.clone())
        .roster(Arc::new(roster))
        .build()?;

    let app = router(runtime.service());
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Arena server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.shutdown().await?;
    tracing::info!("Arena server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
