//! Node service entry point

use anyhow::Result;
use clap::Parser;
use sensegrid_node::{create_router, AppState, NodeStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sensegrid-node")]
#[command(about = "SenseGrid per-node telemetry service")]
#[command(version)]
struct Cli {
    /// Stable node identifier
    #[arg(short, long)]
    node_id: String,

    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:5000")]
    listen: SocketAddr,

    /// Inbound request timeout in seconds
    #[arg(long, default_value = "30")]
    request_timeout: u64,

    /// Outbound relay timeout in seconds
    #[arg(long, default_value = "10")]
    relay_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let store = Arc::new(NodeStore::new(cli.node_id));
    let state = Arc::new(AppState::new(
        store,
        Duration::from_secs(cli.relay_timeout),
    ));
    let router = create_router(state, Duration::from_secs(cli.request_timeout));

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!("Node service listening on {}", cli.listen);
    axum::serve(listener, router).await?;

    Ok(())
}
