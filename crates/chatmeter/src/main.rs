use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatmeter::build_info;
use chatmeter::config::Config;
use chatmeter::server::{self, AppState};

/// Chat proxy for the Anthropic Messages API with per-reply cost estimates.
#[derive(Parser)]
#[command(name = "chatmeter", version = build_info::VERSION)]
struct Cli {
    /// Path to the YAML config file. Defaults are used if it does not exist.
    #[arg(short, long, default_value = "chatmeter.yaml")]
    config: PathBuf,

    /// Override `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let request_timeout = config.server.request_timeout_seconds;
    let state = AppState::from_config(config);
    let app = server::build_app(state, request_timeout);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, version = build_info::VERSION, "chatmeter listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("chatmeter stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
