//! feedstage: the API gateway binary
//!
//! Opens the feed database, runs the one-shot seeding pass, then serves
//! the JSON API. A seeding failure exits before the listener binds so
//! the process never accepts traffic with a partially-seeded store.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use feedstage::api::{create_router, AppState};
use feedstage::config::Config;
use feedstage::seed::Seeder;
use feedstage::storage::FeedDb;

#[derive(Parser)]
#[command(name = "feedstage")]
#[command(about = "Mock social-feed API gateway with a seeded SQLite store")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "feedstage.toml")]
    config: String,

    /// HTTP port (overrides config file)
    #[arg(short, long, env = "FEEDSTAGE_PORT")]
    port: Option<u16>,

    /// Database path; `:memory:` keeps the store in memory
    #[arg(long, env = "FEEDSTAGE_DB_PATH")]
    db_path: Option<String>,

    /// Fixed random seed for reproducible demo data
    #[arg(long, env = "FEEDSTAGE_RNG_SEED")]
    rng_seed: Option<u64>,
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

    info!("Starting feedstage gateway");
    info!("Config file: {}", cli.config);

    // Load or create default config
    let mut config: Config = if std::path::Path::new(&cli.config).exists() {
        let content = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&content)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    // Apply CLI overrides
    if let Some(port) = cli.port {
        config.server.http_port = port;
    }
    if let Some(db_path) = cli.db_path {
        config.storage.db_path = db_path;
    }
    if let Some(seed) = cli.rng_seed {
        config.seed.rng_seed = Some(seed);
    }

    info!("Database: {}", config.storage.db_path);

    let db = if config.storage.db_path == ":memory:" {
        FeedDb::open_in_memory()?
    } else {
        FeedDb::open(Path::new(&config.storage.db_path))?
    };
    let db = Arc::new(db);

    // Seed before serving; a partial seed is fatal.
    let mut rng = match config.seed.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = Seeder::new().run(&db, &mut rng)?;
    info!(
        posts = report.posts,
        profiles = report.profiles,
        rankings = report.rankings,
        "Store seeded"
    );

    let state = Arc::new(AppState::new(db, config.seed.rng_seed));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.http_port));
    info!("API gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
