//! Synthetic engagement metrics
//!
//! Pure functions deriving attention, level, and engagement counts from a
//! post's content and age, and folding post attention into author
//! profiles. Every function takes the random source as a parameter so
//! tests can fix outputs with a seeded generator; nothing here retains
//! state between calls or fails.

use rand::Rng;

use crate::models::Profile;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Metrics attached to a post at creation or seed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostMetrics {
    pub attention: i64,
    pub level: i64,
    pub likes: i64,
    pub comments: i64,
    pub reposts: i64,
}

/// Reputation/attention a profile should carry after recording a post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileFold {
    pub reputation: i64,
    pub attention: i64,
}

/// Coarse content-length tier: one step per 40 characters, clamped to [1, 3].
pub fn length_factor(content: &str) -> i64 {
    (content.len() as i64 / 40).clamp(1, 3)
}

/// Metrics for a seeded post, decayed by synthetic age.
///
/// The age factor is capped at 10 but deliberately not floored: content
/// older than a day decays below factor 1 before the final attention
/// clamp to [1, 1000] catches it.
pub fn derive_seed_metrics<R: Rng>(content: &str, age_minutes: i64, rng: &mut R) -> PostMetrics {
    let factor = length_factor(content);
    let age_factor = (MINUTES_PER_DAY / (age_minutes as f64 + 1.0)).min(10.0);
    let attention = ((50.0 * factor as f64 * age_factor).round() as i64).clamp(1, 1000);
    engagement(attention, factor, rng)
}

/// Metrics for a freshly created post. No age term; attention is a
/// randomized multiple of the length factor, floored at 1.
pub fn derive_create_metrics<R: Rng>(content: &str, rng: &mut R) -> PostMetrics {
    let factor = length_factor(content);
    let attention = ((20.0 * factor as f64 * rng.gen_range(1.0..2.5)).round() as i64).max(1);
    engagement(attention, factor, rng)
}

fn engagement<R: Rng>(attention: i64, length_factor: i64, rng: &mut R) -> PostMetrics {
    let level = 1 + length_factor.min(4);
    let likes = (attention as f64 * rng.gen_range(0.1..0.6)).round() as i64;
    let comments = rng.gen_range(0..=(likes / 4).max(0));
    let reposts = rng.gen_range(0..=(likes / 6).max(0));

    PostMetrics {
        attention,
        level,
        likes,
        comments,
        reposts,
    }
}

/// Fold a new post's attention into its author's profile.
///
/// A first post mints a profile with random starting reputation; later
/// posts only ever add. Both fields are monotone non-decreasing across a
/// profile's lifetime.
pub fn fold_profile_on_new_post<R: Rng>(
    existing: Option<&Profile>,
    post_attention: i64,
    rng: &mut R,
) -> ProfileFold {
    match existing {
        Some(profile) => ProfileFold {
            reputation: profile.reputation + rng.gen_range(1..=10),
            attention: profile.attention + post_attention,
        },
        None => ProfileFold {
            reputation: 50 + rng.gen_range(0..=100),
            attention: post_attention,
        },
    }
}

/// Score used to rank profiles. Ties are left to the caller's stable sort.
pub fn ranking_score(profile: &Profile) -> i64 {
    profile.reputation + profile.attention
}
