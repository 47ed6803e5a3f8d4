//! Gateway HTTP handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::SharedState;
use crate::error::ApiError;
use crate::metrics;
use crate::models::{content_hash, now_rfc3339, Post, Profile, Ranking};
use crate::seed;

const POSTS_LIMIT: i64 = 100;
const PROFILES_LIMIT: i64 = 50;
const RANKINGS_LIMIT: i64 = 20;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Fallback for unmatched paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// GET /api/posts and /api/posts/feed - newest first
pub async fn list_posts(State(state): State<SharedState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.db.list_posts(POSTS_LIMIT)?))
}

/// GET /api/posts/:id
pub async fn get_post(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    state
        .db
        .get_post(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
}

/// POST /api/posts body
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// POST /api/posts - create a post and fold it into the author's profile
pub async fn create_post(
    State(state): State<SharedState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidJson(e.body_text()))?;

    let author = normalize_author(req.author.as_deref());
    let content = req.content.as_deref().unwrap_or("").trim().to_string();
    if content.is_empty() {
        return Err(ApiError::Validation("Content cannot be empty".to_string()));
    }

    let derived = {
        let mut rng = lock_rng(state.as_ref())?;
        metrics::derive_create_metrics(&content, &mut *rng)
    };

    let now = now_rfc3339();
    let post = Post {
        id: Uuid::new_v4().to_string(),
        author: author.clone(),
        content_hash: content_hash(&content),
        content,
        created_at: now.clone(),
        updated_at: now.clone(),
        attention_accumulated: derived.attention,
        level: derived.level,
        likes: derived.likes,
        comments: derived.comments,
        reposts: derived.reposts,
    };
    state.db.insert_post(&post)?;

    {
        let mut rng = lock_rng(state.as_ref())?;
        seed::record_post_for_author(&state.db, &author, derived.attention, &now, &mut *rng)?;
    }

    info!(id = %post.id, author = %post.author, attention = post.attention_accumulated, "Created post");
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/rankings - seed-time snapshot, score desc
pub async fn list_rankings(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Ranking>>, ApiError> {
    let rankings = state.db.list_rankings(RANKINGS_LIMIT)?;
    if !rankings.is_empty() {
        return Ok(Json(rankings));
    }

    // Empty table: hand back a small hardcoded sample so the frontend
    // always has something to draw.
    let now = now_rfc3339();
    let sample = ["Alice", "Bob", "Charlie"]
        .iter()
        .enumerate()
        .map(|(i, author)| Ranking {
            id: (i + 1).to_string(),
            author: (*author).to_string(),
            profile_name: (*author).to_string(),
            score: 1000 - ((i as i64 + 1) * 100),
            created_at: now.clone(),
        })
        .collect();
    Ok(Json(sample))
}

/// GET /api/profiles - reputation desc
pub async fn list_profiles(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(state.db.list_profiles(PROFILES_LIMIT)?))
}

/// POST /api/profiles body
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub author: Option<String>,
}

/// POST /api/profiles - idempotent per author; the existing row wins
pub async fn create_profile(
    State(state): State<SharedState>,
    payload: Result<Json<CreateProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidJson(e.body_text()))?;
    let author = normalize_author(req.author.as_deref());

    if let Some(existing) = state.db.get_profile(&author)? {
        return Ok((StatusCode::CREATED, Json(existing)));
    }

    let (reputation, attention) = {
        let mut rng = lock_rng(state.as_ref())?;
        (rng.gen_range(10..=100), rng.gen_range(0..=200))
    };
    let profile = Profile {
        id: Uuid::new_v4().to_string(),
        author: author.clone(),
        reputation,
        attention,
        created_at: now_rfc3339(),
    };
    state.db.upsert_profile_if_absent(&profile)?;

    // Re-read so a concurrent insert still yields the stored row.
    let stored = state
        .db
        .get_profile(&author)?
        .ok_or_else(|| ApiError::Internal(format!("profile {author} vanished after insert")))?;

    info!(author = %stored.author, "Created profile");
    Ok((StatusCode::CREATED, Json(stored)))
}

fn normalize_author(author: Option<&str>) -> String {
    let trimmed = author.unwrap_or("").trim();
    if trimmed.is_empty() {
        "anonymous".to_string()
    } else {
        trimmed.to_string()
    }
}

fn lock_rng(state: &super::AppState) -> Result<std::sync::MutexGuard<'_, StdRng>, ApiError> {
    state
        .rng
        .lock()
        .map_err(|_| ApiError::Internal("rng lock poisoned".to_string()))
}
