//! Persisted record types shared by the storage layer and the API

use chrono::{Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A post in the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author: String,
    pub content: String,
    /// Truncated SHA-256 fingerprint of `content`. Informational only,
    /// never used for dedup.
    pub content_hash: String,
    pub created_at: String,
    /// Equals `created_at` at creation; there is no edit path.
    pub updated_at: String,
    pub attention_accumulated: i64,
    pub level: i64,
    pub likes: i64,
    pub comments: i64,
    pub reposts: i64,
}

/// Per-author profile. `author` is the unique key; `reputation` and
/// `attention` only ever grow over a profile's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub author: String,
    pub reputation: i64,
    pub attention: i64,
    pub created_at: String,
}

/// Snapshot row from the seed-time ranking pass. `author` and
/// `profile_name` both carry the profile's author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    pub id: String,
    pub author: String,
    pub profile_name: String,
    pub score: i64,
    pub created_at: String,
}

/// Content-addressed fingerprint of a post body: the first 16 hex
/// characters of its SHA-256 digest.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Current time as an RFC 3339 UTC timestamp, the format stored in the
/// database. Lexicographic order on these strings matches time order.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Timestamp `minutes` in the past, for synthetic post ages at seed time.
pub fn minutes_ago_rfc3339(minutes: i64) -> String {
    (Utc::now() - Duration::minutes(minutes)).to_rfc3339_opts(SecondsFormat::Micros, true)
}
