//! Runtime configuration
//!
//! One explicit `Config` value, loaded from a TOML file with serde
//! defaults and CLI overrides applied on top. It is injected into
//! storage, seeding, and router construction; there are no process-wide
//! mutable singletons.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub edge: EdgeConfig,
}

/// Gateway HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the API gateway listens on
    #[serde(default = "default_api_port")]
    pub http_port: u16,
}

/// Feed database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite file; `:memory:` keeps the store in memory
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

/// Seeding pass knobs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Fixed seed for the random source, for reproducible demo data
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Edge server (static files + API proxy)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Port the edge server listens on
    #[serde(default = "default_edge_port")]
    pub http_port: u16,

    /// Gateway base URL that `/api/*` requests are forwarded to
    #[serde(default = "default_upstream")]
    pub upstream: String,

    /// Directory of static frontend assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Forwarding timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Defaults
fn default_api_port() -> u16 {
    3000
}
fn default_db_path() -> String {
    "/tmp/feedstage.db".to_string()
}
fn default_edge_port() -> u16 {
    8080
}
fn default_upstream() -> String {
    "http://127.0.0.1:3000".to_string()
}
fn default_static_dir() -> String {
    "static".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            http_port: default_edge_port(),
            upstream: default_upstream(),
            static_dir: default_static_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
