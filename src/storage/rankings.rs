//! Ranking table operations
//!
//! The ranking table is a snapshot: the seeding pass regenerates it
//! wholesale and nothing else writes to it.

use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::error::StorageError;
use crate::models::Ranking;

fn ranking_from_row(row: &Row) -> Result<Ranking, rusqlite::Error> {
    Ok(Ranking {
        id: row.get("id")?,
        author: row.get("author")?,
        profile_name: row.get("profile_name")?,
        score: row.get("score")?,
        created_at: row.get("created_at")?,
    })
}

/// Clear and repopulate the ranking table in one transaction.
pub fn replace_rankings(
    conn: &mut Connection,
    rankings: &[Ranking],
) -> Result<(), StorageError> {
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM rankings", [])?;
    for ranking in rankings {
        tx.execute(
            "INSERT INTO rankings (id, author, profile_name, score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ranking.id,
                ranking.author,
                ranking.profile_name,
                ranking.score,
                ranking.created_at,
            ],
        )?;
    }

    tx.commit()?;
    debug!(count = rankings.len(), "Replaced ranking table");
    Ok(())
}

pub fn list_rankings(conn: &Connection, limit: i64) -> Result<Vec<Ranking>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT * FROM rankings ORDER BY score DESC LIMIT ?1")?;
    let rankings = stmt
        .query_map(params![limit], ranking_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rankings)
}
