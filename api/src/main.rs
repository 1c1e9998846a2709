use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::net::SocketAddr;

use api::config::AppConfig;
use api::observability::Observability;
use api::routes;
use api::state::AppState;

/// Document intake API server
#[derive(Parser, Debug)]
#[command(name = "api", version, about)]
struct Args {
    /// Address to bind (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides API_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let obs = Observability::init(config.log_format)?;

    // Create app state
    let state = AppState::from_config(&config, obs.registry);
    let app = routes::app(state);

    // Start server
    let addr = config.server.socket_addr()?;
    tracing::info!(
        "API server listening on {} (reference service: {})",
        addr,
        config.reference.base_url
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
