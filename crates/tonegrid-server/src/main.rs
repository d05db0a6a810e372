//! tonegrid server
//!
//! ## Usage
//!
//! ```bash
//! MISTRAL_API_KEY=... tonegrid-server
//! tonegrid-server --config tonegrid.toml --bind 0.0.0.0 --port 8080
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use tonegrid_server::constants::CLEANUP_INTERVAL;
use tonegrid_server::{ServerConfig, SharedPipeline, router};

/// Tone-grid rewrite server.
#[derive(Parser, Debug)]
#[command(name = "tonegrid-server")]
#[command(about = "Serve the tonegrid transform pipeline over HTTP")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let addr = config.socket_addr()?;
    let provider = config.build_provider().context("building LLM provider")?;
    let pipeline: SharedPipeline = Arc::new(config.build_pipeline(provider));

    spawn_housekeeping(pipeline.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(
        %addr,
        model = pipeline.model(),
        prompt_version = pipeline.prompt_version(),
        "tonegrid server listening"
    );

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Periodically drop idle limiter entries and expired cache entries.
fn spawn_housekeeping(pipeline: SharedPipeline) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let clients = pipeline.limiter().cleanup_expired();
            let entries = pipeline.cache().purge_expired();
            tracing::debug!(clients, entries, "housekeeping sweep");
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
