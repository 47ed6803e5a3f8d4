//! Profile CRUD operations
//!
//! `author` is the unique key. Inserts are insert-if-absent (the existing
//! row always wins); only `update_profile` mutates a row in place.

use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::error::StorageError;
use crate::models::Profile;

fn profile_from_row(row: &Row) -> Result<Profile, rusqlite::Error> {
    Ok(Profile {
        id: row.get("id")?,
        author: row.get("author")?,
        reputation: row.get("reputation")?,
        attention: row.get("attention")?,
        created_at: row.get("created_at")?,
    })
}

/// Insert the profile unless its author already has one. Returns true
/// iff a new row was created.
pub fn upsert_profile_if_absent(
    conn: &Connection,
    profile: &Profile,
) -> Result<bool, StorageError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO profiles (id, author, reputation, attention, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            profile.id,
            profile.author,
            profile.reputation,
            profile.attention,
            profile.created_at,
        ],
    )?;

    if inserted > 0 {
        debug!(author = %profile.author, "Created profile");
    }
    Ok(inserted > 0)
}

/// Overwrite reputation and attention for an existing author.
pub fn update_profile(
    conn: &Connection,
    author: &str,
    reputation: i64,
    attention: i64,
) -> Result<(), StorageError> {
    let updated = conn.execute(
        "UPDATE profiles SET reputation = ?1, attention = ?2 WHERE author = ?3",
        params![reputation, attention, author],
    )?;

    if updated == 0 {
        return Err(StorageError::NotFound(format!("profile {author}")));
    }
    Ok(())
}

pub fn get_profile(conn: &Connection, author: &str) -> Result<Option<Profile>, StorageError> {
    let mut stmt = conn.prepare("SELECT * FROM profiles WHERE author = ?1")?;
    let mut rows = stmt.query(params![author])?;

    match rows.next()? {
        Some(row) => Ok(Some(profile_from_row(row)?)),
        None => Ok(None),
    }
}

pub fn list_profiles(conn: &Connection, limit: i64) -> Result<Vec<Profile>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT * FROM profiles ORDER BY reputation DESC LIMIT ?1")?;
    let profiles = stmt
        .query_map(params![limit], profile_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(profiles)
}
