//! One-shot seeding pass
//!
//! Populates the store with a fixed catalog of sample posts, derives
//! each post's metrics, folds them into per-author profiles, then
//! recomputes the ranking snapshot. Runs exactly once per process, to
//! completion, before the gateway accepts traffic; any storage failure
//! here is fatal at startup (restart-from-scratch is the only recovery).

use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StorageError;
use crate::metrics;
use crate::models::{content_hash, minutes_ago_rfc3339, now_rfc3339, Post, Profile, Ranking};
use crate::storage::FeedDb;

/// Rankings kept per seeding pass.
pub const RANKING_TOP_N: usize = 20;

/// Fixed ordered catalog of sample posts: (author, content).
pub const SAMPLE_CATALOG: &[(&str, &str)] = &[
    ("Alice", "Just discovered the future of decentralized social feeds! #demo #feedstage"),
    ("Bob", "Truth and transparency should be the foundation of all digital platforms. Excited about this project!"),
    ("Charlie", "The ability to verify where content came from is game-changing. This feed is onto something big."),
    ("Diana", "Love how the attention mechanism rewards substance over noise. Brilliant! 🚀"),
    ("Eve", "Finally a platform where quality content is rewarded. No more algorithmic manipulation!"),
    ("Frank", "The scoring engine behind this feed is incredibly elegant. Impressive engineering!"),
    ("Grace", "This is what a social feed demo should look like. Count me in! 💪"),
    ("Henry", "The reputation system is fair and transparent. Finally a platform that cares about truth!"),
    ("Ivy", "Joined today and I'm already seeing high-quality discussions. This is refreshing!"),
    ("Jack", "The UI is clean, the performance is snappy. Great work on making the demo actually usable!"),
];

/// Counts from a completed seeding pass, logged at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub posts: usize,
    pub profiles: usize,
    pub rankings: usize,
}

/// Seeding lifecycle. Terminal after one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPhase {
    Idle,
    Seeding,
    Seeded,
}

/// Drives the seeding pass through `Idle -> Seeding -> Seeded`.
pub struct Seeder {
    phase: SeedPhase,
}

impl Seeder {
    pub fn new() -> Self {
        Self {
            phase: SeedPhase::Idle,
        }
    }

    pub fn phase(&self) -> SeedPhase {
        self.phase
    }

    /// Run the full seeding pass. May only be called once; a failed pass
    /// leaves the seeder stuck in `Seeding` and the store partially
    /// populated, which callers must treat as fatal.
    pub fn run<R: Rng>(&mut self, db: &FeedDb, rng: &mut R) -> Result<SeedReport, StorageError> {
        if self.phase != SeedPhase::Idle {
            return Err(StorageError::Internal(
                "seeding pass already ran in this process".into(),
            ));
        }
        self.phase = SeedPhase::Seeding;

        let report = seed_all(db, rng)?;

        self.phase = SeedPhase::Seeded;
        info!(
            posts = report.posts,
            profiles = report.profiles,
            rankings = report.rankings,
            "Seeding pass complete"
        );
        Ok(report)
    }
}

impl Default for Seeder {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_all<R: Rng>(db: &FeedDb, rng: &mut R) -> Result<SeedReport, StorageError> {
    // Drop-and-recreate: prior data is discarded for demo reproducibility.
    db.reset_schema()?;

    let mut posts = 0;
    for (index, (author, content)) in SAMPLE_CATALOG.iter().enumerate() {
        // Space the catalog across the last day or so.
        let age_minutes = index as i64 * 60 + rng.gen_range(5..=120);
        let derived = metrics::derive_seed_metrics(content, age_minutes, rng);
        let created_at = minutes_ago_rfc3339(age_minutes);

        let post = Post {
            id: Uuid::new_v4().to_string(),
            author: (*author).to_string(),
            content: (*content).to_string(),
            content_hash: content_hash(content),
            created_at: created_at.clone(),
            updated_at: created_at.clone(),
            attention_accumulated: derived.attention,
            level: derived.level,
            likes: derived.likes,
            comments: derived.comments,
            reposts: derived.reposts,
        };
        db.insert_post(&post)?;
        posts += 1;

        record_post_for_author(db, author, derived.attention, &created_at, rng)?;
        debug!(author, age_minutes, attention = derived.attention, "Seeded post");
    }

    let profiles = db.list_profiles(i64::MAX)?;
    let pass_stamp = now_rfc3339();
    let mut rankings: Vec<Ranking> = profiles
        .iter()
        .map(|profile| Ranking {
            id: Uuid::new_v4().to_string(),
            author: profile.author.clone(),
            profile_name: profile.author.clone(),
            score: metrics::ranking_score(profile),
            created_at: pass_stamp.clone(),
        })
        .collect();

    // Stable sort keeps insertion order as the tie-break.
    rankings.sort_by(|a, b| b.score.cmp(&a.score));
    rankings.truncate(RANKING_TOP_N);
    db.replace_rankings(&rankings)?;

    Ok(SeedReport {
        posts,
        profiles: profiles.len(),
        rankings: rankings.len(),
    })
}

/// Fold one post's attention into its author's profile, minting the
/// profile on first appearance.
pub fn record_post_for_author<R: Rng>(
    db: &FeedDb,
    author: &str,
    post_attention: i64,
    created_at: &str,
    rng: &mut R,
) -> Result<(), StorageError> {
    let existing = db.get_profile(author)?;
    let fold = metrics::fold_profile_on_new_post(existing.as_ref(), post_attention, rng);

    match existing {
        Some(_) => db.update_profile(author, fold.reputation, fold.attention),
        None => {
            db.upsert_profile_if_absent(&Profile {
                id: Uuid::new_v4().to_string(),
                author: author.to_string(),
                reputation: fold.reputation,
                attention: fold.attention,
                created_at: created_at.to_string(),
            })?;
            Ok(())
        }
    }
}
