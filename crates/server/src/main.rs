//! HTTP server for the movie-agents recommender.
//!
//! Serves `POST /recommend`, `GET|POST /where_to_watch` and `GET /health`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use server::{ServerConfig, build_router};

/// Movie recommendation service backed by cooperating agents
#[derive(Parser)]
#[command(name = "movie-agents-server")]
#[command(about = "Serve movie recommendations with watch availability", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "MOVIE_AGENTS_BIND", default_value = "127.0.0.1:8000")]
    bind: String,

    #[command(flatten)]
    config: ServerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,server=debug,agents=debug")
            }),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting movie-agents server");
    let orchestrator = cli
        .config
        .build_orchestrator()
        .context("Failed to initialise agents")?;
    info!(
        "Registered agents: {}",
        orchestrator.registry().names().join(", ")
    );

    let app = build_router(Arc::new(orchestrator));
    let listener = TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
