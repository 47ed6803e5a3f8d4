//! feedstage: mock backend for a social-feed demo application
//!
//! Two binaries share this crate:
//! - `feedstage` - the HTTP API gateway, backed by a local SQLite store that
//!   is re-seeded with synthetic posts, profiles, and rankings on every start
//! - `feedstage-edge` - a static-file server that proxies `/api/*` requests
//!   to the gateway
//!
//! The only real domain logic lives in [`metrics`] (synthetic engagement
//! scoring) and [`seed`] (the one-shot seeding pass). Everything else is
//! transport plumbing around the [`storage`] layer.

pub mod api;
pub mod config;
pub mod edge;
pub mod error;
pub mod metrics;
pub mod models;
pub mod seed;
pub mod storage;
