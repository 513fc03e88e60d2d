mod config;

use clap::Parser as _;
use claude_relay::{AppState, build_router, client};
use config::Config;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, instrument};

#[tokio::main]
#[instrument]
pub async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    info!("Starting Claude relay with config: {:?}", config);

    let settings = config.settings()?;
    let http_client = client::create_hyper_client(
        config.pool_max_idle_per_host,
        Duration::from_secs(config.pool_idle_timeout_secs),
    );

    let app_state = AppState::with_client(settings, http_client);
    let router = build_router(app_state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Claude relay listening on {}", bind_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
