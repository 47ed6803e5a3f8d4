//! SQLite storage for posts, profiles, and rankings
//!
//! A single local datastore owned by one writer process. All operations
//! are synchronous and serialized through one connection; the store is
//! fully rebuilt by the seeding pass on every process start.

pub mod posts;
pub mod profiles;
pub mod rankings;
pub mod schema;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{Post, Profile, Ranking};

/// Handle to the feed database
pub struct FeedDb {
    conn: Mutex<Connection>,
}

impl FeedDb {
    /// Open or create the database at `db_path`, creating parent
    /// directories as needed.
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Internal(format!("creating data directory: {e}")))?;
            }
        }

        info!(path = %db_path.display(), "Opening feed database");
        let conn = Connection::open(db_path)?;

        // WAL for concurrent read access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(schema::init_schema)?;

        Ok(db)
    }

    /// Open an in-memory database (used by tests and the `:memory:`
    /// config sentinel).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        debug!("Opening in-memory feed database");
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(schema::init_schema)?;

        Ok(db)
    }

    /// Run a closure against the connection with exclusive access.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Internal(format!("lock poisoned: {e}")))?;
        f(&conn)
    }

    fn with_conn_mut<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StorageError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Internal(format!("lock poisoned: {e}")))?;
        f(&mut conn)
    }

    /// Drop and recreate all tables. Called by the seeding pass; prior
    /// data is discarded for demo reproducibility.
    pub fn reset_schema(&self) -> Result<(), StorageError> {
        self.with_conn(schema::reset_schema)
    }

    // --- Posts ---

    pub fn insert_post(&self, post: &Post) -> Result<(), StorageError> {
        self.with_conn(|conn| posts::insert_post(conn, post))
    }

    pub fn get_post(&self, id: &str) -> Result<Option<Post>, StorageError> {
        self.with_conn(|conn| posts::get_post(conn, id))
    }

    /// Posts ordered newest first.
    pub fn list_posts(&self, limit: i64) -> Result<Vec<Post>, StorageError> {
        self.with_conn(|conn| posts::list_posts(conn, limit))
    }

    // --- Profiles ---

    /// Insert a profile unless its author already has one. Returns true
    /// iff a new row was created; an existing row is left untouched.
    pub fn upsert_profile_if_absent(&self, profile: &Profile) -> Result<bool, StorageError> {
        self.with_conn(|conn| profiles::upsert_profile_if_absent(conn, profile))
    }

    /// Overwrite an existing profile's reputation and attention.
    pub fn update_profile(
        &self,
        author: &str,
        reputation: i64,
        attention: i64,
    ) -> Result<(), StorageError> {
        self.with_conn(|conn| profiles::update_profile(conn, author, reputation, attention))
    }

    pub fn get_profile(&self, author: &str) -> Result<Option<Profile>, StorageError> {
        self.with_conn(|conn| profiles::get_profile(conn, author))
    }

    /// Profiles ordered by reputation, highest first.
    pub fn list_profiles(&self, limit: i64) -> Result<Vec<Profile>, StorageError> {
        self.with_conn(|conn| profiles::list_profiles(conn, limit))
    }

    // --- Rankings ---

    /// Atomically clear and repopulate the ranking table.
    pub fn replace_rankings(&self, rankings: &[Ranking]) -> Result<(), StorageError> {
        self.with_conn_mut(|conn| rankings::replace_rankings(conn, rankings))
    }

    /// Rankings ordered by score, highest first.
    pub fn list_rankings(&self, limit: i64) -> Result<Vec<Ranking>, StorageError> {
        self.with_conn(|conn| rankings::list_rankings(conn, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{content_hash, minutes_ago_rfc3339, now_rfc3339};

    fn post(id: &str, author: &str, minutes_ago: i64) -> Post {
        let content = format!("post {id} by {author}");
        let ts = minutes_ago_rfc3339(minutes_ago);
        Post {
            id: id.to_string(),
            author: author.to_string(),
            content_hash: content_hash(&content),
            content,
            created_at: ts.clone(),
            updated_at: ts,
            attention_accumulated: 10,
            level: 2,
            likes: 3,
            comments: 1,
            reposts: 0,
        }
    }

    fn profile(id: &str, author: &str, reputation: i64) -> Profile {
        Profile {
            id: id.to_string(),
            author: author.to_string(),
            reputation,
            attention: 5,
            created_at: now_rfc3339(),
        }
    }

    #[test]
    fn test_insert_and_get_post() {
        let db = FeedDb::open_in_memory().unwrap();
        let p = post("a", "Alice", 10);
        db.insert_post(&p).unwrap();

        let fetched = db.get_post("a").unwrap().expect("post should exist");
        assert_eq!(fetched.author, "Alice");
        assert_eq!(fetched.content, p.content);
        assert_eq!(fetched.content_hash, p.content_hash);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[test]
    fn test_get_missing_post_is_none() {
        let db = FeedDb::open_in_memory().unwrap();
        assert!(db.get_post("nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_post_id_rejected() {
        let db = FeedDb::open_in_memory().unwrap();
        db.insert_post(&post("a", "Alice", 10)).unwrap();
        let err = db.insert_post(&post("a", "Bob", 5)).unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(_)));
    }

    #[test]
    fn test_list_posts_newest_first_with_limit() {
        let db = FeedDb::open_in_memory().unwrap();
        db.insert_post(&post("old", "Alice", 120)).unwrap();
        db.insert_post(&post("new", "Bob", 1)).unwrap();
        db.insert_post(&post("mid", "Carol", 60)).unwrap();

        let all = db.list_posts(100).unwrap();
        assert_eq!(
            all.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["new", "mid", "old"]
        );

        let top = db.list_posts(2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, "new");
    }

    #[test]
    fn test_upsert_profile_if_absent_keeps_existing_row() {
        let db = FeedDb::open_in_memory().unwrap();
        assert!(db.upsert_profile_if_absent(&profile("p1", "Nova", 80)).unwrap());
        // Second insert for the same author is a no-op; first row wins.
        assert!(!db.upsert_profile_if_absent(&profile("p2", "Nova", 999)).unwrap());

        let stored = db.get_profile("Nova").unwrap().unwrap();
        assert_eq!(stored.id, "p1");
        assert_eq!(stored.reputation, 80);
        assert_eq!(db.list_profiles(50).unwrap().len(), 1);
    }

    #[test]
    fn test_update_profile_overwrites_in_place() {
        let db = FeedDb::open_in_memory().unwrap();
        db.upsert_profile_if_absent(&profile("p1", "Nova", 80)).unwrap();
        db.update_profile("Nova", 90, 42).unwrap();

        let stored = db.get_profile("Nova").unwrap().unwrap();
        assert_eq!(stored.reputation, 90);
        assert_eq!(stored.attention, 42);
    }

    #[test]
    fn test_update_missing_profile_is_not_found() {
        let db = FeedDb::open_in_memory().unwrap();
        let err = db.update_profile("Ghost", 1, 1).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_list_profiles_by_reputation_desc() {
        let db = FeedDb::open_in_memory().unwrap();
        db.upsert_profile_if_absent(&profile("p1", "Low", 10)).unwrap();
        db.upsert_profile_if_absent(&profile("p2", "High", 500)).unwrap();
        db.upsert_profile_if_absent(&profile("p3", "Mid", 100)).unwrap();

        let authors: Vec<_> = db
            .list_profiles(50)
            .unwrap()
            .into_iter()
            .map(|p| p.author)
            .collect();
        assert_eq!(authors, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn test_replace_rankings_clears_previous_pass() {
        let db = FeedDb::open_in_memory().unwrap();
        let ts = now_rfc3339();
        let mk = |id: &str, author: &str, score: i64| Ranking {
            id: id.to_string(),
            author: author.to_string(),
            profile_name: author.to_string(),
            score,
            created_at: ts.clone(),
        };

        db.replace_rankings(&[mk("r1", "Alice", 300), mk("r2", "Bob", 200)])
            .unwrap();
        db.replace_rankings(&[mk("r3", "Carol", 900)]).unwrap();

        let rankings = db.list_rankings(20).unwrap();
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].author, "Carol");
    }

    #[test]
    fn test_list_rankings_by_score_desc() {
        let db = FeedDb::open_in_memory().unwrap();
        let ts = now_rfc3339();
        let mk = |id: &str, score: i64| Ranking {
            id: id.to_string(),
            author: id.to_string(),
            profile_name: id.to_string(),
            score,
            created_at: ts.clone(),
        };

        db.replace_rankings(&[mk("a", 100), mk("b", 900), mk("c", 500)])
            .unwrap();

        let scores: Vec<_> = db
            .list_rankings(20)
            .unwrap()
            .into_iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(scores, vec![900, 500, 100]);
    }

    #[test]
    fn test_reset_schema_discards_data() {
        let db = FeedDb::open_in_memory().unwrap();
        db.insert_post(&post("a", "Alice", 10)).unwrap();
        db.reset_schema().unwrap();
        assert!(db.list_posts(100).unwrap().is_empty());
    }
}
