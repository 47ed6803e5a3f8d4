//! Post CRUD operations

use rusqlite::{params, Connection, ErrorCode, Row};
use tracing::debug;

use crate::error::StorageError;
use crate::models::Post;

fn post_from_row(row: &Row) -> Result<Post, rusqlite::Error> {
    Ok(Post {
        id: row.get("id")?,
        author: row.get("author")?,
        content: row.get("content")?,
        content_hash: row.get("content_hash")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        attention_accumulated: row.get("attention_accumulated")?,
        level: row.get("level")?,
        likes: row.get("likes")?,
        comments: row.get("comments")?,
        reposts: row.get("reposts")?,
    })
}

/// Insert a post. Fails with `DuplicateKey` if the id already exists,
/// which should never happen with generated UUIDs.
pub fn insert_post(conn: &Connection, post: &Post) -> Result<(), StorageError> {
    let result = conn.execute(
        "INSERT INTO posts (id, author, content, content_hash, created_at, updated_at,
                            attention_accumulated, level, likes, comments, reposts)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            post.id,
            post.author,
            post.content,
            post.content_hash,
            post.created_at,
            post.updated_at,
            post.attention_accumulated,
            post.level,
            post.likes,
            post.comments,
            post.reposts,
        ],
    );

    match result {
        Ok(_) => {
            debug!(id = %post.id, author = %post.author, "Inserted post");
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            Err(StorageError::DuplicateKey(format!("post {}", post.id)))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_post(conn: &Connection, id: &str) -> Result<Option<Post>, StorageError> {
    let mut stmt = conn.prepare("SELECT * FROM posts WHERE id = ?1")?;
    let mut rows = stmt.query(params![id])?;

    match rows.next()? {
        Some(row) => Ok(Some(post_from_row(row)?)),
        None => Ok(None),
    }
}

pub fn list_posts(conn: &Connection, limit: i64) -> Result<Vec<Post>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT * FROM posts ORDER BY created_at DESC LIMIT ?1")?;
    let posts = stmt
        .query_map(params![limit], post_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}
