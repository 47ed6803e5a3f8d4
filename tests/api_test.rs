//! Gateway HTTP API integration tests
//!
//! Each test binds the real router on an ephemeral port and talks to it
//! over HTTP, the same way the edge server and frontend do.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

use feedstage::api::{create_router, AppState};
use feedstage::models::{content_hash, Post, Profile, Ranking};
use feedstage::seed::{Seeder, SAMPLE_CATALOG};
use feedstage::storage::FeedDb;

/// Bind a gateway on an ephemeral port. Returns its base URL and the db.
async fn spawn_gateway(seeded: bool) -> (String, Arc<FeedDb>) {
    let db = Arc::new(FeedDb::open_in_memory().expect("in-memory db"));
    if seeded {
        let mut rng = StdRng::seed_from_u64(42);
        Seeder::new().run(&db, &mut rng).expect("seeding pass");
    }

    let state = Arc::new(AppState::new(db.clone(), Some(42)));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), db)
}

#[tokio::test]
async fn test_list_posts_returns_seeded_feed_newest_first() {
    let (base, _db) = spawn_gateway(true).await;

    for path in ["/api/posts", "/api/posts/feed"] {
        let posts: Vec<Post> = reqwest::get(format!("{base}{path}"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(posts.len(), SAMPLE_CATALOG.len());
        for pair in posts.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}

#[tokio::test]
async fn test_get_post_is_idempotent() {
    let (base, db) = spawn_gateway(true).await;
    let id = db.list_posts(1).unwrap()[0].id.clone();

    let first: Post = reqwest::get(format!("{base}/api/posts/{id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Post = reqwest::get(format!("{base}/api/posts/{id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.content, second.content);
    assert_eq!(first.attention_accumulated, second.attention_accumulated);
}

#[tokio::test]
async fn test_get_missing_post_is_404() {
    let (base, _db) = spawn_gateway(true).await;

    let resp = reqwest::get(format!("{base}/api/posts/no-such-id"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Post not found");
}

#[tokio::test]
async fn test_create_post_round_trips() {
    let (base, db) = spawn_gateway(true).await;
    let client = reqwest::Client::new();
    let content = "hello world, this is a test post";

    let resp = client
        .post(format!("{base}/api/posts"))
        .json(&json!({ "author": "Zed", "content": content }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let created: Post = resp.json().await.unwrap();
    assert_eq!(created.author, "Zed");
    assert_eq!(created.content, content);
    assert_eq!(created.content_hash, content_hash(content));
    assert!(created.attention_accumulated >= 1);
    assert_eq!(created.created_at, created.updated_at);

    let fetched: Post = reqwest::get(format!("{base}/api/posts/{}", created.id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.author, created.author);
    assert_eq!(fetched.content, created.content);
    assert_eq!(fetched.content_hash, created.content_hash);

    // The post also minted a profile for its author.
    let profile = db.get_profile("Zed").unwrap().expect("Zed profile");
    assert_eq!(profile.attention, created.attention_accumulated);
}

#[tokio::test]
async fn test_create_post_grows_author_profile_monotonically() {
    let (base, db) = spawn_gateway(true).await;
    let client = reqwest::Client::new();

    // Alice already has a seeded profile.
    let before = db.get_profile("Alice").unwrap().unwrap();

    let created: Post = client
        .post(format!("{base}/api/posts"))
        .json(&json!({ "author": "Alice", "content": "posting again after the seed pass" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let after = db.get_profile("Alice").unwrap().unwrap();
    assert!(after.reputation > before.reputation);
    assert_eq!(after.attention, before.attention + created.attention_accumulated);
}

#[tokio::test]
async fn test_create_post_with_empty_content_persists_nothing() {
    let (base, db) = spawn_gateway(true).await;
    let client = reqwest::Client::new();
    let posts_before = db.list_posts(100).unwrap().len();

    for body in [json!({ "content": "" }), json!({ "content": "   " }), json!({})] {
        let resp = client
            .post(format!("{base}/api/posts"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Content cannot be empty");
    }

    assert_eq!(db.list_posts(100).unwrap().len(), posts_before);
}

#[tokio::test]
async fn test_create_post_without_author_defaults_to_anonymous() {
    let (base, _db) = spawn_gateway(true).await;
    let client = reqwest::Client::new();

    let created: Post = client
        .post(format!("{base}/api/posts"))
        .json(&json!({ "content": "who wrote this anyway" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created.author, "anonymous");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let (base, _db) = spawn_gateway(true).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/posts"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid JSON:"), "got: {message}");
}

#[tokio::test]
async fn test_rankings_sorted_and_capped() {
    let (base, _db) = spawn_gateway(true).await;

    let rankings: Vec<Ranking> = reqwest::get(format!("{base}/api/rankings"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(!rankings.is_empty());
    assert!(rankings.len() <= 20);
    for pair in rankings.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_rankings_fall_back_to_sample_when_table_empty() {
    let (base, _db) = spawn_gateway(false).await;

    let rankings: Vec<Ranking> = reqwest::get(format!("{base}/api/rankings"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(rankings.len(), 3);
    assert_eq!(rankings[0].author, "Alice");
    assert_eq!(rankings[0].score, 900);
    assert_eq!(rankings[2].score, 700);
}

#[tokio::test]
async fn test_list_profiles_by_reputation() {
    let (base, _db) = spawn_gateway(true).await;

    let profiles: Vec<Profile> = reqwest::get(format!("{base}/api/profiles"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(profiles.len(), 10);
    for pair in profiles.windows(2) {
        assert!(pair[0].reputation >= pair[1].reputation);
    }
}

#[tokio::test]
async fn test_create_profile_is_idempotent_per_author() {
    let (base, db) = spawn_gateway(true).await;
    let client = reqwest::Client::new();

    let first: Profile = client
        .post(format!("{base}/api/profiles"))
        .json(&json!({ "author": "Nova" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let second_resp = client
        .post(format!("{base}/api/profiles"))
        .json(&json!({ "author": "Nova" }))
        .send()
        .await
        .unwrap();
    assert_eq!(second_resp.status(), 201);

    let second: Profile = second_resp.json().await.unwrap();
    assert_eq!(first.id, second.id);

    let novas = db
        .list_profiles(50)
        .unwrap()
        .into_iter()
        .filter(|p| p.author == "Nova")
        .count();
    assert_eq!(novas, 1);
}

#[tokio::test]
async fn test_unmatched_path_is_404() {
    let (base, _db) = spawn_gateway(true).await;

    let resp = reqwest::get(format!("{base}/api/unknown/thing"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_cors_header_present_for_browser_requests() {
    let (base, _db) = spawn_gateway(true).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/api/posts"))
        .header("origin", "http://localhost:8080")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_preflight_allowed() {
    let (base, _db) = spawn_gateway(true).await;
    let client = reqwest::Client::new();

    let resp = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/posts"))
        .header("origin", "http://localhost:8080")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let (base, _db) = spawn_gateway(true).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}
