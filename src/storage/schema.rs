//! Database schema for the three feed tables

use rusqlite::Connection;
use tracing::info;

use crate::error::StorageError;

const TABLES: &str = "
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    author TEXT NOT NULL,
    content TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    attention_accumulated INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    likes INTEGER NOT NULL DEFAULT 0,
    comments INTEGER NOT NULL DEFAULT 0,
    reposts INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    author TEXT NOT NULL UNIQUE,
    reputation INTEGER NOT NULL DEFAULT 0,
    attention INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rankings (
    id TEXT PRIMARY KEY,
    author TEXT NOT NULL,
    profile_name TEXT NOT NULL,
    score INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
";

const DROP_TABLES: &str = "
DROP TABLE IF EXISTS posts;
DROP TABLE IF EXISTS profiles;
DROP TABLE IF EXISTS rankings;
";

/// Create the tables if they don't exist yet.
pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(TABLES)?;
    Ok(())
}

/// Drop and recreate all tables, discarding any prior data.
pub fn reset_schema(conn: &Connection) -> Result<(), StorageError> {
    info!("Resetting feed database schema");
    conn.execute_batch(DROP_TABLES)?;
    conn.execute_batch(TABLES)?;
    Ok(())
}
