//! feedstage-edge: static frontend server with API pass-through
//!
//! Serves frontend assets with cache-busting headers and forwards every
//! `/api/*` request to the gateway.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use feedstage::config::Config;
use feedstage::edge::{create_router, EdgeState};

#[derive(Parser)]
#[command(name = "feedstage-edge")]
#[command(about = "Static-file edge server that proxies /api/* to the feedstage gateway")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "feedstage.toml")]
    config: String,

    /// HTTP port (overrides config file)
    #[arg(short, long, env = "FEEDSTAGE_EDGE_PORT")]
    port: Option<u16>,

    /// Gateway base URL to forward /api/* requests to
    #[arg(long, env = "FEEDSTAGE_EDGE_UPSTREAM")]
    upstream: Option<String>,

    /// Directory of static frontend assets
    #[arg(long, env = "FEEDSTAGE_EDGE_STATIC_DIR")]
    static_dir: Option<String>,

    /// Forwarding timeout in seconds
    #[arg(long, env = "FEEDSTAGE_EDGE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("feedstage=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting feedstage edge server");
    info!("Config file: {}", cli.config);

    let mut config: Config = if std::path::Path::new(&cli.config).exists() {
        let content = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&content)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    // Apply CLI overrides
    if let Some(port) = cli.port {
        config.edge.http_port = port;
    }
    if let Some(upstream) = cli.upstream {
        config.edge.upstream = upstream;
    }
    if let Some(static_dir) = cli.static_dir {
        config.edge.static_dir = static_dir;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.edge.timeout_secs = timeout_secs;
    }

    info!("Upstream: {}", config.edge.upstream);
    info!("Static dir: {}", config.edge.static_dir);

    let state = Arc::new(EdgeState::new(
        config.edge.upstream.clone(),
        Duration::from_secs(config.edge.timeout_secs),
    )?);
    let app = create_router(state, Path::new(&config.edge.static_dir));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.edge.http_port));
    info!("Edge server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
