//! Request gateway - HTTP JSON API over the feed store
//!
//! Decodes inbound requests, invokes the metrics engine and storage, and
//! encodes results as JSON. Every response carries
//! `Access-Control-Allow-Origin: *`.

pub mod routes;

use std::sync::{Arc, Mutex};

use axum::routing::get;
use axum::Router;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower_http::cors::{Any, CorsLayer};

use crate::storage::FeedDb;

/// Gateway state shared across handlers
pub struct AppState {
    pub db: Arc<FeedDb>,
    /// Random source for create-time metrics. Seedable from config so
    /// demos are reproducible.
    pub rng: Mutex<StdRng>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Arc<FeedDb>, rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            db,
            rng: Mutex::new(rng),
        }
    }
}

/// Create the gateway router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/posts", get(routes::list_posts).post(routes::create_post))
        .route("/api/posts/feed", get(routes::list_posts))
        .route("/api/posts/:id", get(routes::get_post))
        .route("/api/rankings", get(routes::list_rankings))
        .route("/api/profiles", get(routes::list_profiles).post(routes::create_profile))
        .route("/health", get(routes::health))
        .fallback(routes::not_found)
        .layer(cors)
        .with_state(state)
}
